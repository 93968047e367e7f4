//! Rule-based résumé extraction: static skill and domain lists, year phrases,
//! and achievement patterns. Used when the model is disabled or its reply is unusable.

use std::sync::OnceLock;

use regex::Regex;

const COMMON_SKILLS: &[&str] = &[
    "JavaScript", "TypeScript", "React", "Vue", "Angular", "Node.js", "Express",
    "Next.js", "Nuxt.js", "Svelte", "HTML", "CSS", "SASS", "LESS", "Tailwind",
    "Bootstrap", "Material UI", "Chakra UI", "GraphQL", "REST", "SQL", "NoSQL",
    "MongoDB", "PostgreSQL", "MySQL", "Firebase", "AWS", "Azure", "GCP", "Vercel",
    "Netlify", "Docker", "Kubernetes", "CI/CD", "Git", "GitHub", "GitLab",
    "Bitbucket", "Jest", "Mocha", "Cypress", "Selenium", "Redux", "MobX", "Zustand",
    "Python", "Django", "Flask", "FastAPI", "Ruby", "Rails", "PHP", "Laravel",
    "Symfony", "Java", "Spring", "Kotlin", "Swift", "Objective-C", "C#", ".NET",
    "C++", "C", "Rust", "Go", "Scala", "Elixir", "Haskell", "Clojure", "Unity",
    "Unreal Engine", "Flutter", "React Native", "Ionic", "Electron", "PWA",
    "WebSockets", "WebRTC", "Three.js", "D3.js", "TensorFlow", "PyTorch", "scikit-learn",
    "Pandas", "NumPy", "R", "MATLAB", "Tableau", "Power BI", "Excel", "Word", "PowerPoint",
    "Figma", "Sketch", "Adobe XD", "Photoshop", "Illustrator", "InDesign", "After Effects",
    "Premiere Pro", "Blender", "Agile", "Scrum", "Kanban", "Jira", "Confluence", "Trello",
    "Asana", "Notion", "Slack", "Teams", "Zoom", "WebEx", "Google Meet", "Skype",
    "Linux", "Windows", "macOS", "iOS", "Android", "Ubuntu", "Debian", "CentOS",
    "Red Hat", "Bash", "PowerShell", "CMD", "Terminal", "SSH", "FTP", "HTTP", "HTTPS",
    "TCP/IP", "DNS", "DHCP", "VPN", "SSL", "TLS", "OAuth", "JWT", "SAML", "Auth0",
    "Okta", "Cognito", "Firebase Auth", "Active Directory", "LDAP", "SEO", "SEM",
    "Google Analytics", "Hotjar", "Mixpanel", "Segment", "Amplitude", "Optimizely",
    "A/B Testing", "Web Vitals", "Lighthouse", "Webpack", "Rollup", "Vite", "Parcel",
    "Babel", "ESLint", "Prettier", "Husky", "Lint-Staged", "Storybook", "Docz",
    "JSDoc", "TypeDoc", "Swagger", "OpenAPI", "Postman", "Insomnia", "curl", "wget",
    "Redis", "Memcached", "Elasticsearch", "Kibana", "Logstash", "Grafana", "Prometheus",
    "New Relic", "Datadog", "Sentry", "Bugsnag", "LogRocket", "PagerDuty", "Twilio",
    "SendGrid", "Mailchimp", "Stripe", "PayPal", "Braintree", "Square", "Adyen",
    "WordPress", "Drupal", "Magento", "Shopify", "WooCommerce", "BigCommerce",
    "Salesforce", "HubSpot", "Marketo", "Pardot", "Eloqua", "Zendesk", "Intercom",
    "Crisp", "Drift", "Algolia", "Meilisearch", "WebAssembly", "WASM", "WebGL",
];

const DOMAINS: &[&str] = &[
    "Web Development", "Frontend Development", "Backend Development",
    "Full Stack Development", "Mobile Development", "iOS Development",
    "Android Development", "Cross-Platform Development", "Game Development",
    "DevOps", "SRE", "Cloud Engineering", "Data Science", "Machine Learning",
    "Artificial Intelligence", "Data Engineering", "Data Analytics",
    "Business Intelligence", "UI/UX Design", "Product Design", "Graphic Design",
    "Product Management", "Project Management", "QA Engineering", "Testing",
    "Security Engineering", "Cybersecurity", "Blockchain Development",
    "AR/VR Development", "Embedded Systems", "IoT Development",
    "Network Engineering", "Systems Administration", "Database Administration",
    "Technical Support", "Technical Writing",
];

/// Domain → the listed skills that point at it. Order breaks ties.
const DOMAIN_SKILLS: &[(&str, &[&str])] = &[
    (
        "Frontend Development",
        &[
            "React", "Vue", "Angular", "HTML", "CSS", "SASS", "LESS", "Tailwind",
            "Bootstrap", "Material UI", "Chakra UI", "JavaScript", "TypeScript",
        ],
    ),
    (
        "Backend Development",
        &[
            "Node.js", "Express", "Django", "Flask", "Laravel", "Spring", "Ruby on Rails",
            "PostgreSQL", "MySQL", "MongoDB", "Redis", "GraphQL", "REST",
        ],
    ),
    (
        "Mobile Development",
        &[
            "Swift", "Objective-C", "Kotlin", "Java", "Flutter", "React Native",
            "Ionic", "Android", "iOS",
        ],
    ),
    (
        "Data Science",
        &[
            "Python", "R", "TensorFlow", "PyTorch", "scikit-learn", "Pandas", "NumPy",
            "MATLAB", "Tableau", "Power BI",
        ],
    ),
    (
        "DevOps",
        &[
            "Docker", "Kubernetes", "AWS", "Azure", "GCP", "CI/CD", "Jenkins", "Terraform",
            "Ansible", "Prometheus", "Grafana",
        ],
    ),
    (
        "UI/UX Design",
        &["Figma", "Sketch", "Adobe XD", "Photoshop", "Illustrator", "InDesign"],
    ),
];

/// Minimum skill hits before a domain is inferred from skills alone.
const MIN_DOMAIN_SKILL_MATCHES: usize = 2;

const YEAR_PATTERNS: &[(&str, i32)] = &[
    (r"(?i)1st year|first year|freshman", 1),
    (r"(?i)2nd year|second year|sophomore", 2),
    (r"(?i)3rd year|third year|junior", 3),
    (r"(?i)4th year|fourth year|senior", 4),
    (r"(?i)5th year|fifth year", 5),
];

const ACHIEVEMENT_PATTERNS: &[&str] = &[
    r"(?i)(?:won|winner of|awarded|recipient of|selected for|finalist in|placed \d+(?:st|nd|rd|th) in)\s+([^.\n]+)",
    r"(?i)(?:hackathon|competition|contest|challenge|award|scholarship|fellowship|grant)\s+([^.\n]+)",
    r"(?i)(?:open source contributor|maintainer|creator of)\s+([^.\n]+)",
    r"(?i)(?:published|author of|co-authored)\s+([^.\n]+)",
    r"(?i)(?:intern|internship|interned)\s+(?:at|with)\s+([^.\n]+)",
    r"(?i)(?:gsoc|google summer of code|mlh fellow)",
];

fn year_regexes() -> &'static [(Regex, i32)] {
    static CELL: OnceLock<Vec<(Regex, i32)>> = OnceLock::new();
    CELL.get_or_init(|| {
        YEAR_PATTERNS
            .iter()
            .filter_map(|(pattern, year)| Regex::new(pattern).ok().map(|re| (re, *year)))
            .collect()
    })
}

fn achievement_regexes() -> &'static [Regex] {
    static CELL: OnceLock<Vec<Regex>> = OnceLock::new();
    CELL.get_or_init(|| {
        ACHIEVEMENT_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Skills from the static list that appear in the text as whole tokens.
/// Case-insensitive; list order is kept and duplicates are dropped.
pub fn extract_skills(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut skills: Vec<String> = Vec::new();

    for &skill in COMMON_SKILLS {
        if contains_token(&text_lower, &skill.to_lowercase())
            && !skills.iter().any(|s| s == skill)
        {
            skills.push(skill.to_string());
        }
    }

    skills
}

/// First domain named verbatim in the text, otherwise one inferred from skills.
pub fn extract_domain(text: &str) -> Option<String> {
    let text_lower = text.to_lowercase();

    DOMAINS
        .iter()
        .find(|domain| text_lower.contains(&domain.to_lowercase()))
        .map(|domain| domain.to_string())
        .or_else(|| infer_domain_from_skills(&extract_skills(text)))
}

/// The domain with the most skill hits, provided it has at least two.
pub fn infer_domain_from_skills(skills: &[String]) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for (domain, domain_skills) in DOMAIN_SKILLS {
        let count = skills
            .iter()
            .filter(|skill| domain_skills.contains(&skill.as_str()))
            .count();
        if count > best.map(|(_, c)| c).unwrap_or(0) {
            best = Some((*domain, count));
        }
    }

    best.filter(|(_, count)| *count >= MIN_DOMAIN_SKILL_MATCHES)
        .map(|(domain, _)| domain.to_string())
}

pub fn extract_year_of_study(text: &str) -> Option<i32> {
    year_regexes()
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, year)| *year)
}

/// Phrases following achievement cues ("won", "intern at", ...), trimmed and de-duplicated.
pub fn extract_achievements(text: &str) -> Vec<String> {
    let mut achievements: Vec<String> = Vec::new();

    for re in achievement_regexes() {
        for caps in re.captures_iter(text) {
            let found = caps.get(1).or_else(|| caps.get(0));
            if let Some(m) = found {
                let achievement = m.as_str().trim().to_string();
                if !achievement.is_empty() && !achievements.contains(&achievement) {
                    achievements.push(achievement);
                }
            }
        }
    }

    achievements
}

/// Substring match that refuses to land inside a longer alphanumeric word,
/// so "Go" does not match "Google" and "R" does not match "React".
fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
