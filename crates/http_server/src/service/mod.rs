pub mod encoding;
pub mod fs;
pub mod handlers;
pub mod router;

use log::debug;

use crate::{
    http::{request::Request, response::Response},
    policy::WriteFailurePolicy,
    service::{fs::FileStore, router::Route},
};

/// Turns one request into one response
pub trait Service: Send + Sync + 'static {
    fn call(&self, req: Request) -> impl Future<Output = Response> + Send;
}

/// The fixed set of routes, serving files out of a [`FileStore`]
pub struct App<S: FileStore> {
    store: S,
    write_failure: WriteFailurePolicy,
}

impl<S: FileStore> App<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_failure: WriteFailurePolicy::default(),
        }
    }

    pub fn with_write_failure(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: FileStore> Service for App<S> {
    fn call(&self, req: Request) -> impl Future<Output = Response> + Send {
        async move {
            let route = Route::resolve(req.path());
            debug!(
                "{} {} from {:?} -> {:?}",
                req.method,
                req.path(),
                req.remote,
                route
            );
            match route {
                Route::Root => handlers::root(&req),
                Route::UserAgent => handlers::user_agent(&req),
                Route::Echo(payload) => handlers::echo(&req, payload),
                Route::Files(name) => {
                    handlers::files(&req, name, &self.store, self.write_failure).await
                }
                Route::NotFound => handlers::not_found(&req),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        http::{method::Method, response::StatusCode},
        service::fs::MemoryStore,
    };

    #[tokio::test]
    async fn dispatch() {
        let app = App::new(MemoryStore::new());

        let res = app.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status, StatusCode::OK);

        let res = app.call(Request::new(Method::GET, "/echo/hey")).await;
        assert_eq!(res.body().as_bytes(), b"hey");

        let res = app
            .call(Request::new(Method::GET, "/user-agent").with_header("User-Agent", "ua"))
            .await;
        assert_eq!(res.body().as_bytes(), b"ua");

        let res = app.call(Request::new(Method::GET, "/nonexistent/path")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let res = app.call(Request::new(Method::GET, "/echo")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        let res = app
            .call(Request::new(Method::POST, "/files/n").with_body(&b"B"[..]))
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(
            app.store().read("n").await.unwrap(),
            bytes::Bytes::from_static(b"B")
        );

        let res = app.call(Request::new(Method::PUT, "/files/n")).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
