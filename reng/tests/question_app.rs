//! A question-list page: the list reducer keeps a reducer-local id counter
//! in its scratch data and appends entries to an array slice.

use std::rc::Rc;

use reng::prelude::*;
use serde_json::{json, Value};

fn question_reducer() -> Rc<ReducerDef> {
    ReducerDef::builder()
        .on_init(|ctx| {
            ctx.data = json!({"next_id": 0});
        })
        .route("AddQuestion", |ctx, state, action| {
            let next_id = ctx.data["next_id"].as_i64().unwrap_or(0) + 1;
            ctx.data["next_id"] = json!(next_id);

            let mut questions = state.as_array().cloned().unwrap_or_default();
            questions.push(json!({
                "id": next_id,
                "subject": action.get("subject").cloned().unwrap_or(Value::Null),
                "body": action.get("body").cloned().unwrap_or(Value::Null),
            }));
            Value::Array(questions)
        })
        .build()
        .unwrap()
}

fn question_slices() -> Slices {
    Slices::new().child("questions", question_reducer())
}

#[test]
fn adds_questions_with_increasing_ids() {
    let mut page = Page::load(question_slices(), json!({"questions": []}), AppConfig::new());

    page.dispatch_sync(
        Action::new("AddQuestion")
            .with("subject", "first")
            .with("body", "body one"),
    );
    page.dispatch_sync(
        Action::new("AddQuestion")
            .with("subject", "second")
            .with("body", "body two"),
    );

    assert_eq!(
        page.state()["questions"],
        json!([
            {"id": 1, "subject": "first", "body": "body one"},
            {"id": 2, "subject": "second", "body": "body two"},
        ])
    );
}

#[test]
fn unmatched_actions_leave_the_list_untouched() {
    let input = json!({"questions": [{"id": 1, "subject": "s", "body": "b"}]});
    let mut page = Page::load(question_slices(), input.clone(), AppConfig::new());

    page.dispatch_sync(Action::new("SomethingElse"));
    assert_eq!(page.state()["questions"], input["questions"]);
}

#[test]
fn id_counter_survives_across_reduce_calls_but_not_state() {
    let mut page = Page::load(question_slices(), json!({"questions": []}), AppConfig::new());

    page.dispatch_sync(Action::new("AddQuestion").with("subject", "a").with("body", "a"));
    // reset the list through an override-free path: re-seed via init action
    page.dispatch_sync(Action::init());
    assert_eq!(page.state()["questions"], json!([]));

    // the reducer-local counter keeps going; ids do not restart
    page.dispatch_sync(Action::new("AddQuestion").with("subject", "b").with("body", "b"));
    assert_eq!(page.state()["questions"][0]["id"], json!(2));
}
