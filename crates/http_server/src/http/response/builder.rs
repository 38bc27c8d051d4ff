use bytes::Bytes;

use crate::http::{
    HttpVersion,
    header::{ContentType, HeaderField, HeaderMap},
    request::Request,
    response::{Response, StatusCode},
};

pub struct ResponseBuilder {
    version: HttpVersion,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseBuilder {
    pub const DEFAULT_CONTENT_TYPE: &'static str = "text/plain";

    pub fn from_req(req: &Request, status: StatusCode) -> Self {
        Self::new(req.version.clone(), status)
    }

    pub fn new(version: HttpVersion, status: StatusCode) -> Self {
        Self {
            version,
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn build(self) -> Response {
        let ResponseBuilder {
            version,
            status,
            mut headers,
            body,
        } = self;

        let message = Bytes::from_static(
            status
                .canonical_reason()
                .unwrap_or("Unknown Reason")
                .as_bytes(),
        );

        if !headers.contains(ContentType::NAME) {
            headers.set_header::<ContentType>(Self::DEFAULT_CONTENT_TYPE.to_owned());
        }

        let mut response = Response {
            version,
            message,
            status,
            headers,
            body: Default::default(),
        };
        response.set_body(body);
        response
    }

    pub fn set_header<NAME>(mut self, val: NAME::Output) -> Self
    where
        NAME: HeaderField,
    {
        self.headers.set_header::<NAME>(val);
        self
    }

    pub fn body(mut self, bytes: Bytes) -> Self {
        self.body = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::header::ContentLength;

    #[test]
    fn defaults() {
        let res = ResponseBuilder::new(HttpVersion::HTTP_1_1, StatusCode::NOT_FOUND).build();
        assert_eq!(res.message, Bytes::from_static(b"Not Found"));
        assert_eq!(
            res.headers.get_header::<ContentType>().unwrap().as_deref(),
            Some("text/plain")
        );
        assert!(!res.headers.contains(ContentLength::NAME));
    }

    #[test]
    fn explicit_content_type() {
        let res = ResponseBuilder::new(HttpVersion::HTTP_1_1, StatusCode::OK)
            .set_header::<ContentType>("application/octet-stream".to_owned())
            .body(Bytes::from_static(b"\x00\x01"))
            .build();
        assert_eq!(res.message, Bytes::from_static(b"OK"));
        assert_eq!(
            res.headers.get("content-type").unwrap().as_bytes(),
            b"application/octet-stream"
        );
        assert_eq!(res.headers.get_header::<ContentLength>().unwrap(), Some(2));
    }
}
