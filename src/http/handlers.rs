use hyper::{HeaderMap, Method, body::Incoming, header};
use std::{sync::Arc, time::Instant};

use crate::prelude::*;
use super::{Body, Context, Request, Response, log, response};


/// This is the main HTTP entry point, called for each incoming request.
pub(super) async fn handle(req: Request<Incoming>, ctx: Arc<Context>) -> Response {
    log::req::log(&req);
    if ctx.log_headers {
        log::headers::log(&req);
    }

    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/').to_owned();

    match (path.as_str(), method) {
        ("/graphql", Method::POST) => handle_api(req, &ctx).await,
        ("/graphql", Method::GET) if wants_graphiql(&req) => graphiql().await,
        ("/graphql", Method::GET) if is_get_mutation(&req) => {
            debug!("Rejecting mutation sent via GET");
            response::mutation_via_get()
        }
        ("/graphql", Method::GET) => handle_api(req, &ctx).await,

        // The interactive GraphQL API explorer/IDE.
        ("/graphiql", Method::GET) => graphiql().await,

        ("/graphql" | "/graphiql", method) => {
            debug!("Responding with 405 to {method:?} '{path}'");
            response::method_not_allowed()
        }
        (_, method) => {
            debug!("Responding with 404 to {method:?} '{path}'");
            response::not_found()
        }
    }
}

/// Browsers navigating to `/graphql` get the GraphiQL console instead of an
/// error about a missing query.
fn wants_graphiql<B>(req: &Request<B>) -> bool {
    query_param(req, "query").is_none() && accepts_html(req.headers())
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers.get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("text/html"))
}

fn query_param<B>(req: &Request<B>, name: &str) -> Option<String> {
    let query = req.uri().query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

async fn graphiql() -> Response {
    juniper_hyper::graphiql("/graphql", None).await.map(Body::from)
}

/// Whether the GET request asks to execute a mutation, which must only be
/// done via POST.
fn is_get_mutation<B>(req: &Request<B>) -> bool {
    let Some(document) = query_param(req, "query") else {
        return false;
    };
    let operation_name = query_param(req, "operationName");
    let operations = operations(&document);

    let selected = match operation_name {
        Some(name) => operations.iter().find(|op| op.name == Some(name.as_str())),
        None => operations.first().filter(|_| operations.len() == 1),
    };
    selected.is_some_and(|op| op.kind == "mutation")
}

#[derive(Debug, PartialEq, Eq)]
struct Operation<'a> {
    /// `query`, `mutation` or `subscription`.
    kind: &'a str,
    name: Option<&'a str>,
}

/// Lists the operation definitions of a GraphQL document. This only looks at
/// the top level tokens; juniper validates the document properly later.
fn operations(document: &str) -> Vec<Operation<'_>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut in_definition = false;
    let mut awaiting_name = false;

    let bytes = document.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'"' if document[i..].starts_with(r#"""""#) => {
                i = document[i + 3..].find(r#"""""#).map_or(bytes.len(), |end| i + 3 + end + 3);
                continue;
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
                continue;
            }
            b'{' if depth == 0 => {
                if !in_definition {
                    out.push(Operation { kind: "query", name: None });
                    in_definition = true;
                }
                awaiting_name = false;
                depth += 1;
            }
            b'{' | b'(' | b'[' => {
                awaiting_name = false;
                depth += 1;
            }
            b'}' | b')' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && c == b'}' {
                    in_definition = false;
                }
            }
            b'@' => awaiting_name = false,
            c if c == b'_' || c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                let word = &document[start..i];

                if depth == 0 && awaiting_name {
                    if let Some(op) = out.last_mut() {
                        op.name = Some(word);
                    }
                    awaiting_name = false;
                } else if depth == 0 && !in_definition {
                    match word {
                        "query" | "mutation" | "subscription" => {
                            out.push(Operation { kind: word, name: None });
                            awaiting_name = true;
                        }
                        _ => {}
                    }
                    in_definition = true;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    out
}

/// Handles a request to `/graphql`.
async fn handle_api(req: Request<Incoming>, ctx: &Context) -> Response {
    let before = Instant::now();
    let out = juniper_hyper::graphql(Arc::clone(&ctx.api_root), Arc::clone(&ctx.api), req).await;
    debug!("Finished /graphql query in {:.2?}", before.elapsed());

    out.map(Body::from)
}


#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http_body_util::{BodyExt, Full};
    use hyper::{Method, StatusCode, header, server::conn::http1, service::service_fn};
    use hyper_util::rt::TokioIo;
    use std::{convert::Infallible, sync::Arc, time::Duration};

    use crate::{
        api::{self, ApiConfig},
        store::{MemoryStore, RecordStore, seed_videos},
    };
    use super::{Context, Operation, handle, is_get_mutation, operations};


    fn context() -> (Arc<Context>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_records("video", seed_videos()));
        let config = ApiConfig { create_delay: Duration::ZERO, seed: true };
        let ctx = Arc::new(Context {
            api_root: Arc::new(api::root_node()),
            api: Arc::new(api::Context::new(store.clone(), config).unwrap()),
            log_headers: false,
        });
        (ctx, store)
    }

    fn request(method: Method, uri: &str) -> hyper::http::request::Builder {
        hyper::Request::builder().method(method).uri(uri)
    }

    /// Sends the request through an in-memory HTTP/1 connection to `handle`.
    async fn send_to(ctx: Arc<Context>, req: hyper::Request<Full<Bytes>>) -> (StatusCode, String) {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let ctx = Arc::clone(&ctx);
                async move { Ok::<_, Infallible>(handle(req, ctx).await) }
            });
            http1::Builder::new().serve_connection(TokioIo::new(server_io), service).await
        });

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(client_io))
            .await
            .unwrap();
        tokio::spawn(conn);

        let response = sender.send_request(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn send(req: hyper::Request<Full<Bytes>>) -> (StatusCode, String) {
        send_to(context().0, req).await
    }

    async fn get(uri: &str) -> (StatusCode, String) {
        send(request(Method::GET, uri).body(Full::default()).unwrap()).await
    }

    async fn post(content_type: &str, body: &'static str) -> (StatusCode, String) {
        let req = request(Method::POST, "/graphql")
            .header(header::CONTENT_TYPE, content_type)
            .body(Full::from(body))
            .unwrap();
        send(req).await
    }

    fn json(s: &str) -> serde_json::Value {
        serde_json::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn post_json() {
        let (status, body) = post(
            "application/json",
            r#"{ "query": "{ node(id: \"VmlkZW86YQ==\") { ... on Video { title } } }" }"#,
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!({
            "data": { "node": { "title": "Create a GraphQL Schema" } },
        }));
    }

    #[tokio::test]
    async fn post_batch() {
        let (status, body) = post(
            "application/json",
            r#"[{ "query": "{ a: video(id: \"a\") { watched } }" },
                { "query": "{ b: video(id: \"b\") { watched } }" }]"#,
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!([
            { "data": { "a": { "watched": true } } },
            { "data": { "b": { "watched": false } } },
        ]));
    }

    #[tokio::test]
    async fn post_graphql_body() {
        let (status, body) = post("application/graphql", "{ videos { totalCount } }").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!({ "data": { "videos": { "totalCount": 2 } } }));
    }

    #[tokio::test]
    async fn post_invalid() {
        let (status, _) = post("application/json", "{ not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post("application/json", r#"{ "query": "{ nope }" }"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body).get("errors").is_some());
    }

    #[tokio::test]
    async fn get_query() {
        let (status, body) = get(
            "/graphql?query=query%20Q(%24id%3A%20ID!)%20%7B%20video(id%3A%20%24id)%20%7B%20title%20%7D%20%7D\
                &variables=%7B%22id%22%3A%22b%22%7D",
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!({
            "data": { "video": { "title": "Ember.js CLI" } },
        }));

        let (status, _) = get("/graphql").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get("/graphql?query=%7B%20videos%20%7B%20totalCount%20%7D%20%7D&variables=nope")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_mutation_is_rejected() {
        let (ctx, store) = context();
        let uri = "/graphql?query=mutation%20%7B%20createVideo(input%3A%20%7Btitle%3A%20%22x%22%7D)\
            %20%7B%20clientMutationId%20%7D%20%7D";
        let (status, body) = send_to(ctx, request(Method::GET, uri).body(Full::default()).unwrap())
            .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "Can only perform a mutation operation from a POST request");
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);

        // Picking the query out of a document that also has a mutation is fine.
        let (status, body) = get(
            "/graphql?query=query%20Q%20%7B%20videos%20%7B%20totalCount%20%7D%20%7D\
                %20mutation%20M%20%7B%20createVideo(input%3A%20%7B%7D)%20%7B%20clientMutationId%20%7D%20%7D\
                &operationName=Q",
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body), serde_json::json!({ "data": { "videos": { "totalCount": 2 } } }));

        let (status, _) = get(
            "/graphql?query=query%20Q%20%7B%20videos%20%7B%20totalCount%20%7D%20%7D\
                %20mutation%20M%20%7B%20createVideo(input%3A%20%7B%7D)%20%7B%20clientMutationId%20%7D%20%7D\
                &operationName=M",
        ).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn mutation_via_post() {
        let (ctx, store) = context();
        let req = request(Method::POST, "/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::from(
                r#"{ "query": "mutation { createVideo(input: { title: \"x\" }) { clientMutationId } }" }"#,
            ))
            .unwrap();
        let (status, _) = send_to(ctx, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.fetch_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn graphiql() {
        let (status, body) = get("/graphiql").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/graphql"));

        let req = request(Method::GET, "/graphql")
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Full::default())
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.to_lowercase().contains("<html"));
    }

    #[tokio::test]
    async fn unknown_routes() {
        assert_eq!(get("/").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get("/videos").await.0, StatusCode::NOT_FOUND);

        let req = request(Method::DELETE, "/graphql").body(Full::default()).unwrap();
        assert_eq!(send(req).await.0, StatusCode::METHOD_NOT_ALLOWED);
        let req = request(Method::POST, "/graphiql").body(Full::default()).unwrap();
        assert_eq!(send(req).await.0, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn operation_list() {
        let op = |kind, name| Operation { kind, name };

        assert_eq!(operations("{ videos { totalCount } }"), [op("query", None)]);
        assert_eq!(operations("mutation Add { createVideo(input: {}) { clientMutationId } }"), [
            op("mutation", Some("Add")),
        ]);
        assert_eq!(operations("query($id: ID!) { video(id: $id) { title } }"), [op("query", None)]);
        assert_eq!(operations("subscription S @live { x }"), [op("subscription", Some("S"))]);
        assert_eq!(
            operations(r#"
                # mutation Fake { x }
                query A { video(id: "mutation { }") { title } }
                fragment F on Video { title }
                mutation B { createVideo(input: { title: """ mutation " """ }) { clientMutationId } }
            "#),
            [op("query", Some("A")), op("mutation", Some("B"))],
        );
    }

    #[test]
    fn get_mutation_detection() {
        let check = |uri: &str| is_get_mutation(&request(Method::GET, uri).body(()).unwrap());

        assert!(check("/graphql?query=mutation%7Bx%7D"));
        assert!(check("/graphql?query=mutation%20A%7Bx%7D%20query%20B%7By%7D&operationName=A"));
        assert!(!check("/graphql?query=mutation%20A%7Bx%7D%20query%20B%7By%7D&operationName=B"));
        assert!(!check("/graphql?query=%7Bx%7D"));
        assert!(!check("/graphql"));

        // Ambiguous documents are left to juniper, which reports the error.
        assert!(!check("/graphql?query=mutation%20A%7Bx%7D%20query%20B%7By%7D"));
    }
}
