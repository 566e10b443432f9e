//! Shared plumbing for request gates.
//!
//! A gate inspects a request before the wrapped service runs and either lets
//! it through or answers with the domain [`Error`] it raised. Rejections are
//! rendered in place so outer middleware (tracing) still sees a response.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use futures_util::future::{LocalBoxFuture, ready};
use tracing::debug;

use crate::domain::Error;

/// Admission decision for one request.
pub trait Admission: Clone + 'static {
    /// Short label used in logs.
    const NAME: &'static str;

    /// Admit the request or explain why not.
    fn admit(&self, req: &ServiceRequest) -> Result<(), Error>;
}

/// Service produced by gate transforms.
///
/// Applications wrap the gate types themselves, not this one.
pub struct GateMiddleware<S, A> {
    service: S,
    admission: A,
}

impl<S, A> GateMiddleware<S, A> {
    pub(crate) fn new(service: S, admission: A) -> Self {
        Self { service, admission }
    }
}

impl<S, B, A> Service<ServiceRequest> for GateMiddleware<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: Admission,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.admission.admit(&req) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(error) => {
                debug!(gate = A::NAME, path = %req.path(), code = ?error.code(), "request rejected");
                let response = req.error_response(error).map_into_right_body();
                Box::pin(ready(Ok(response)))
            }
        }
    }
}

/// Implements `Transform` for a gate type so it can be passed to `.wrap()`.
macro_rules! gate_transform {
    ($gate:ty) => {
        impl<S, B> actix_web::dev::Transform<S, actix_web::dev::ServiceRequest> for $gate
        where
            S: actix_web::dev::Service<
                    actix_web::dev::ServiceRequest,
                    Response = actix_web::dev::ServiceResponse<B>,
                    Error = actix_web::Error,
                > + 'static,
            S::Future: 'static,
            B: 'static,
        {
            type Response = actix_web::dev::ServiceResponse<actix_web::body::EitherBody<B>>;
            type Error = actix_web::Error;
            type InitError = ();
            type Transform = $crate::inbound::http::gate::GateMiddleware<S, $gate>;
            type Future = futures_util::future::Ready<Result<Self::Transform, Self::InitError>>;

            fn new_transform(&self, service: S) -> Self::Future {
                futures_util::future::ready(Ok(
                    $crate::inbound::http::gate::GateMiddleware::new(service, self.clone()),
                ))
            }
        }
    };
}

pub(crate) use gate_transform;
