//! Hand-built multipart/form-data bodies with a fixed boundary

const CRLF: &[u8] = b"\r\n";

/// Boundary used by browsers built on WebKit; fixed so request bodies are reproducible
pub const DEFAULT_BOUNDARY: &str = "----WebKitFormBoundary7MA4YWxkTrZu0gW";

/// One file part of a form
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A multipart/form-data body made of file parts
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    parts: Vec<FilePart>,
}

impl MultipartBody {
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize the body; lines are CRLF-joined and the body ends with CRLF
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut lines: Vec<Vec<u8>> = Vec::new();

        for part in &self.parts {
            lines.push(format!("--{}", self.boundary).into_bytes());
            lines.push(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                    part.field, part.file_name
                )
                .into_bytes(),
            );
            lines.push(format!("Content-Type: {}", part.content_type).into_bytes());
            lines.push(Vec::new());
            lines.push(part.data.clone());
        }
        lines.push(format!("--{}--", self.boundary).into_bytes());
        lines.push(Vec::new());

        lines.join(CRLF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_layout() {
        let body = MultipartBody::new("XyZ").file("file", "a.png", "image/png", b"DATA".to_vec());

        let expected = concat!(
            "--XyZ\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n",
            "Content-Type: image/png\r\n",
            "\r\n",
            "DATA\r\n",
            "--XyZ--\r\n",
        );
        assert_eq!(body.to_bytes(), expected.as_bytes());
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XyZ");
    }

    #[test]
    fn test_binary_payload_is_kept_verbatim() {
        let payload = vec![0x89, b'P', b'N', b'G', 0x00, b'\r', b'\n', 0xff];
        let bytes = MultipartBody::new(DEFAULT_BOUNDARY)
            .file("file", "x.png", "image/png", payload.clone())
            .to_bytes();

        let start = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap()
            + 4;
        assert_eq!(&bytes[start..start + payload.len()], payload.as_slice());
        assert!(bytes.ends_with(format!("\r\n--{}--\r\n", DEFAULT_BOUNDARY).as_bytes()));
    }
}
