use std::io::{self, Write};

use bytes::Bytes;
use flate2::{Compression, write::GzEncoder};

use crate::http::{
    header::{AcceptEncoding, ContentCoding, ContentEncoding},
    request::Request,
    response::Response,
};

/// Picks the coding for a response body from the request's `Accept-Encoding`
///
/// Any occurrence of `gzip` in the header selects gzip, without looking at token boundaries
/// or q-values.
pub fn negotiate(req: &Request) -> ContentCoding {
    match req.headers.get_header::<AcceptEncoding>() {
        Ok(Some(accepted)) if accepted.contains(ContentCoding::Gzip.as_str()) => {
            ContentCoding::Gzip
        }
        _ => ContentCoding::Identity,
    }
}

/// Applies `coding` to the response body
///
/// `Content-Length` is recomputed from the encoded body.
pub fn encode(response: &mut Response, coding: ContentCoding) -> io::Result<()> {
    match coding {
        ContentCoding::Identity => Ok(()),
        ContentCoding::Gzip => {
            let compressed = gzip(response.body().as_bytes())?;
            response.set_body(compressed);
            response.headers.set_header::<ContentEncoding>(ContentCoding::Gzip);
            Ok(())
        }
    }
}

fn gzip(data: &[u8]) -> io::Result<Bytes> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    Ok(Bytes::from(encoder.finish()?))
}

#[cfg(test)]
mod tests {
    use skiff_http_test_suite::gunzip;

    use super::*;
    use crate::http::{
        header::ContentLength,
        method::Method,
        response::{ResponseBuilder, StatusCode},
    };

    #[test]
    fn negotiation_is_substring_based() {
        let cases = [
            (None, ContentCoding::Identity),
            (Some("gzip"), ContentCoding::Gzip),
            (Some("deflate, gzip;q=0.5, br"), ContentCoding::Gzip),
            (Some("x-gzip"), ContentCoding::Gzip),
            (Some("deflate, br"), ContentCoding::Identity),
            (Some("invalid-encoding"), ContentCoding::Identity),
        ];

        for (accept, coding) in cases {
            let mut req = Request::new(Method::GET, "/echo/abc");
            if let Some(accept) = accept {
                req = req.with_header("Accept-Encoding", accept);
            }
            assert_eq!(negotiate(&req), coding, "{accept:?}");
        }
    }

    #[test]
    fn gzip_sets_headers_from_compressed_body() {
        let mut res = ResponseBuilder::new(Default::default(), StatusCode::OK)
            .body(Bytes::from_static(b"abcabcabcabcabcabc"))
            .build();
        encode(&mut res, ContentCoding::Gzip).unwrap();

        let body = res.body().as_bytes();
        assert_eq!(
            res.headers.get_header::<ContentLength>().unwrap(),
            Some(body.len() as u64)
        );
        assert_eq!(
            res.headers.get_header::<ContentEncoding>().unwrap(),
            Some(ContentCoding::Gzip)
        );
        assert_eq!(gunzip(body).unwrap(), b"abcabcabcabcabcabc");
    }

    #[test]
    fn identity_leaves_body_alone() {
        let mut res = ResponseBuilder::new(Default::default(), StatusCode::OK)
            .body(Bytes::from_static(b"abc"))
            .build();
        encode(&mut res, ContentCoding::Identity).unwrap();
        assert_eq!(res.body().as_bytes(), b"abc");
        assert!(res.headers.get("Content-Encoding").is_none());
    }
}
