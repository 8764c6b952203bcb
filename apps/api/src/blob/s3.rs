use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::debug;

use super::{BlobError, BlobStore};

/// HTTP status S3 returns when `If-None-Match: *` finds an existing object.
const PRECONDITION_FAILED: u16 = 412;

/// S3 / MinIO backed blob store. One bucket holds every prompt's content.
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn write_once(&self, path: &str, bytes: Bytes) -> Result<(), BlobError> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .if_none_match("*")
            .body(ByteStream::from(bytes))
            .content_type("text/plain; charset=utf-8")
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!("Uploaded prompt content to s3://{}/{}", self.bucket, path);
                Ok(())
            }
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                if status == Some(PRECONDITION_FAILED) {
                    Err(BlobError::AlreadyExists {
                        path: path.to_string(),
                    })
                } else {
                    Err(BlobError::Backend(format!(
                        "S3 upload of {path} failed: {}",
                        DisplayErrorContext(&err)
                    )))
                }
            }
        }
    }

    async fn read(&self, path: &str) -> Result<Bytes, BlobError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_no_such_key() {
                    BlobError::NotFound {
                        path: path.to_string(),
                    }
                } else {
                    BlobError::Backend(format!(
                        "S3 download of {path} failed: {}",
                        DisplayErrorContext(&err)
                    ))
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| BlobError::Backend(format!("S3 body read of {path} failed: {e}")))?;
        Ok(data.into_bytes())
    }
}
