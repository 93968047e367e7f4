use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

pub fn resume_key(upload_id: Uuid) -> String {
    format!("resumes/{upload_id}.pdf")
}

/// Path-style URL for an object, which works for both MinIO and S3.
pub fn object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

/// Stores the original PDF and returns its object key.
pub async fn store_resume(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    upload_id: Uuid,
    pdf: Bytes,
) -> Result<String, AppError> {
    let key = resume_key(upload_id);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Stored resume at s3://{}/{}", bucket, key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_trims_trailing_slash() {
        assert_eq!(
            object_url("http://localhost:9000/", "pointblank", "resumes/a.pdf"),
            "http://localhost:9000/pointblank/resumes/a.pdf"
        );
    }

    #[test]
    fn test_resume_key() {
        assert_eq!(resume_key(Uuid::nil()), "resumes/00000000-0000-0000-0000-000000000000.pdf");
    }
}
