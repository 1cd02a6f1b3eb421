//! A page whose reducer calls out over HTTP and reports back through a
//! follow-up event action. Requests are answered by a configured override,
//! so nothing touches the network.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use reng::prelude::*;
use reng::testing::TestHarness;
use serde_json::{json, Value};

const INCREMENT_URL: &str = "http://fake.org/functions/increment";

fn count_reducer() -> Rc<ReducerDef> {
    ReducerDef::builder()
        .route("Increment", |ctx, state, _action| {
            let http = ctx.http().clone();
            ctx.tasks().spawn("increment", async move {
                match http.request(HttpRequest::get(INCREMENT_URL)).await {
                    Ok(result) => Action::new("IncrementComplete")
                        .with("args", json!({"result": result, "error": null})),
                    Err(error) => Action::new("IncrementComplete")
                        .with("args", json!({"result": 0, "error": error.to_string()})),
                }
            });
            state
        })
        .route("IncrementComplete", |ctx, state, action| {
            let args = action.args().cloned().unwrap_or(Value::Null);
            if !args["error"].is_null() {
                ctx.errors().handle(args["error"].as_str().unwrap_or("unknown error"));
                return state;
            }
            args["result"].clone()
        })
        .build()
        .unwrap()
}

fn count_slices() -> Slices {
    Slices::new().child("count", count_reducer())
}

#[tokio::test]
async fn http_result_arrives_as_follow_up_action() {
    let config = AppConfig::new().request_override(RequestOverride::routes([(
        format!("GET:{INCREMENT_URL}"),
        json!(6),
    )]));
    let mut harness = TestHarness::load(count_slices(), json!({"count": 0}), config);

    harness.dispatch_sync(Action::new("Increment"));
    // the call-out leaves state untouched until the follow-up lands
    assert_eq!(harness.state()["count"], json!(0));

    let notice = harness
        .wait_for("IncrementComplete", Duration::from_secs(1))
        .await
        .expect("follow-up action should arrive");
    assert_eq!(notice.state["count"], json!(6));
    assert_eq!(harness.state()["count"], json!(6));
}

#[tokio::test]
async fn rejected_request_routes_through_the_errors_service() {
    let handled = Rc::new(RefCell::new(Vec::new()));
    let sink = handled.clone();
    let mut config = AppConfig::new().request_override(RequestOverride::routes([(
        format!("GET:{INCREMENT_URL}"),
        RouteReply::Reject("increment is down".into()),
    )]));
    config.errors = Some(Rc::new(move |message: &str| {
        sink.borrow_mut().push(message.to_string());
    }));

    let mut harness = TestHarness::load(count_slices(), json!({"count": 2}), config);
    harness.dispatch_sync(Action::new("Increment"));
    harness
        .wait_for("IncrementComplete", Duration::from_secs(1))
        .await
        .expect("follow-up action should arrive");

    // state is preserved and the error reached the configured hook
    assert_eq!(harness.state()["count"], json!(2));
    assert_eq!(handled.borrow().len(), 1);
    assert!(handled.borrow()[0].contains("increment is down"));
}

#[tokio::test]
async fn missing_route_is_reported_not_swallowed() {
    let config = AppConfig::new()
        .request_override(RequestOverride::routes([("GET:http://other.org/x", json!(1))]));
    let mut harness = TestHarness::load(count_slices(), json!({"count": 0}), config);

    harness.dispatch_sync(Action::new("Increment"));
    let notice = harness
        .wait_for("IncrementComplete", Duration::from_secs(1))
        .await
        .expect("follow-up action should arrive");

    // state unchanged; the error travelled in the follow-up action
    assert_eq!(notice.state["count"], json!(0));
    assert_eq!(harness.state()["count"], json!(0));
}
