//! Minimal waku example — a JSON sign-up endpoint behind the timing filter.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example signup
//!
//! Try:
//!   curl http://localhost:8080/
//!   curl -X POST http://localhost:8080/sign-up \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice","password":"pw","re_password":"pw"}'
//!   curl -X POST http://localhost:8080/sign-up -d 'not json'
//!   curl http://localhost:8080/nowhere        # fixed 404, plain bytes

use serde::{Deserialize, Serialize};
use tracing::error;
use waku::{Context, Routable, Server, timing};

#[derive(Deserialize)]
struct SignUpReq {
    name: String,
    password: String,
    re_password: String,
}

/// The response envelope every endpoint answers with.
#[derive(Serialize)]
struct BizResponse {
    biz_code: i32,
    msg: String,
    data: i32,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut server = Server::new("signup-demo").wrap(timing);
    server.route("GET", "/", index);
    server.route("POST", "/sign-up", sign_up);

    server.start("127.0.0.1:8080").await.expect("server failed");
}

// GET /
async fn index(mut ctx: Context) -> Context {
    write_or_log(&mut ctx, BizResponse { biz_code: 0, msg: String::new(), data: 123 });
    ctx
}

// POST /sign-up
//
// Decode failures are the handler's call: here they become a 400 carrying
// the raw error text. The toolkit never maps errors to statuses for you.
async fn sign_up(mut ctx: Context) -> Context {
    let req: SignUpReq = match ctx.read_json().await {
        Ok(req) => req,
        Err(e) => {
            if let Err(e) = ctx.write_bad(&e.to_string()) {
                error!("write response failed: {e}");
            }
            return ctx;
        }
    };

    if req.password != req.re_password {
        write_or_log(
            &mut ctx,
            BizResponse { biz_code: 4, msg: "passwords do not match".to_owned(), data: 0 },
        );
        return ctx;
    }

    tracing::info!(name = %req.name, "signed up");
    write_or_log(&mut ctx, BizResponse { biz_code: 0, msg: String::new(), data: 123 });
    ctx
}

fn write_or_log(ctx: &mut Context, resp: BizResponse) {
    if let Err(e) = ctx.write_ok(&resp) {
        error!("write response failed: {e}");
    }
}
