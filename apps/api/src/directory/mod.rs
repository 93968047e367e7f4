// Directory: members and their skills, achievements, experiences and links,
// plus the public search over them.

pub mod handlers;
pub mod members;
pub mod profile;
pub mod records;
pub mod search;
pub mod skills;
