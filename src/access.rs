//! # Access Modes
//!
//! The deployment chooses between an open ingress (throttled upstream, no
//! identity) and a verified ingress (bearer tokens checked by the external
//! access-control layer, which injects the verified subject as a header).
//! Token verification itself never happens here; the request-handling code is
//! identical across both modes.

use std::str::FromStr;

use axum::{extract::Request, middleware::Next, response::Response};

/// Header carrying the upstream-verified subject claim.
pub const VERIFIED_SUB_HEADER: &str = "x-verified-sub";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    Open,
    Verified,
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(AccessMode::Open),
            "verified" => Ok(AccessMode::Verified),
            other => Err(format!("Unknown access mode: {other}")),
        }
    }
}

/// Opaque caller identity lifted from the verified-subject header.
#[derive(Clone, Debug)]
pub struct Identity(pub String);

/// Middleware for verified deployments. Absence of the header is not an
/// error; handlers fall back to a sentinel identity.
pub async fn attach_identity(mut request: Request, next: Next) -> Response {
    let sub = request
        .headers()
        .get(VERIFIED_SUB_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Some(sub) = sub {
        request.extensions_mut().insert(Identity(sub));
    }

    next.run(request).await
}
