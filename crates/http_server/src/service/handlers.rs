use bytes::Bytes;
use log::{error, warn};

use crate::{
    http::{
        header::{ContentType, HeaderField, UserAgent},
        method::Method,
        request::Request,
        response::{Response, ResponseBuilder, StatusCode},
    },
    policy::WriteFailurePolicy,
    service::{encoding, fs::FileStore},
};

const OCTET_STREAM: &str = "application/octet-stream";

fn text(req: &Request, status: StatusCode, body: Bytes) -> Response {
    ResponseBuilder::from_req(req, status)
        .set_header::<ContentType>(ResponseBuilder::DEFAULT_CONTENT_TYPE.to_owned())
        .body(body)
        .build()
}

fn empty(req: &Request, status: StatusCode) -> Response {
    ResponseBuilder::from_req(req, status).build()
}

pub fn root(req: &Request) -> Response {
    empty(req, StatusCode::OK)
}

pub fn not_found(req: &Request) -> Response {
    empty(req, StatusCode::NOT_FOUND)
}

pub fn method_not_allowed(req: &Request) -> Response {
    empty(req, StatusCode::METHOD_NOT_ALLOWED)
}

pub fn user_agent(req: &Request) -> Response {
    let agent = req
        .header(UserAgent::NAME)
        .map(|value| Bytes::copy_from_slice(value.as_bytes()))
        .unwrap_or_default();
    text(req, StatusCode::OK, agent)
}

/// Echoes `payload`, gzipped when the client accepts it
pub fn echo(req: &Request, payload: &str) -> Response {
    let mut res = text(req, StatusCode::OK, Bytes::copy_from_slice(payload.as_bytes()));
    let coding = encoding::negotiate(req);
    if let Err(err) = encoding::encode(&mut res, coding) {
        // The plain body is still a correct answer
        error!("failed to apply {} to echo body: {}", coding, err);
    }
    res
}

pub async fn files<S: FileStore>(
    req: &Request,
    name: &str,
    store: &S,
    write_failure: WriteFailurePolicy,
) -> Response {
    if req.method == Method::GET {
        get_file(req, name, store).await
    } else if req.method == Method::POST {
        post_file(req, name, store, write_failure).await
    } else {
        method_not_allowed(req)
    }
}

async fn get_file<S: FileStore>(req: &Request, name: &str, store: &S) -> Response {
    match store.read(name).await {
        Ok(contents) => ResponseBuilder::from_req(req, StatusCode::OK)
            .set_header::<ContentType>(OCTET_STREAM.to_owned())
            .body(contents)
            .build(),
        Err(err) => {
            warn!("cannot read {:?}: {}", name, err);
            not_found(req)
        }
    }
}

async fn post_file<S: FileStore>(
    req: &Request,
    name: &str,
    store: &S,
    write_failure: WriteFailurePolicy,
) -> Response {
    let contents = req.body.clone().into_bytes();
    match store.write(name, contents).await {
        Ok(()) => empty(req, StatusCode::CREATED),
        Err(err) => {
            warn!("cannot write {:?}: {}", name, err);
            match write_failure {
                WriteFailurePolicy::ReportOk => empty(req, StatusCode::OK),
                WriteFailurePolicy::ReportError => empty(req, StatusCode::INTERNAL_SERVER_ERROR),
            }
        }
    }
}
