//! Small inline modules to make it possible to filter out individual log
//! messages with our filter system (e.g. `reelay::http::log::headers`).

use hyper::Request;
use crate::prelude::*;

pub(super) mod req {
    use super::*;

    pub(in crate::http) fn log<B>(req: &Request<B>) {
        trace!(
            method = ?req.method(),
            path = req.uri().path_and_query().map_or("", |pq| pq.as_str()),
            "Incoming HTTP request",
        );
    }
}

pub(super) mod headers {
    use std::fmt::Write;
    use super::*;

    pub(in crate::http) fn log<B>(req: &Request<B>) {
        if tracing::enabled!(tracing::Level::TRACE) {
            let mut out = String::new();
            for (name, value) in req.headers() {
                let _ = write!(out, "\n  {}: {}", name, String::from_utf8_lossy(value.as_bytes()));
            }
            trace!("HTTP Headers: {out}");
        }
    }
}
