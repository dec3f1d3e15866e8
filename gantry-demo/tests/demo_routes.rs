// The demo namespace, bootstrapped and dispatched end to end

use gantry::gantry_config::Settings;
use gantry::{Application, RequestContext, ResponseSink, NOT_FOUND_BODY};

// Link the demo components into this test binary.
use gantry_demo as _;

fn demo_app() -> Application {
    let settings = Settings::from_pairs([("scan_root", "gantry_demo")]);
    Application::bootstrap_from(settings.values()).unwrap()
}

fn dispatch(app: &Application, ctx: RequestContext) -> Option<String> {
    let mut sink = ResponseSink::new();
    app.dispatch(&ctx, &mut sink);
    sink.into_body()
}

#[test]
fn demo_routes_are_mapped() {
    let app = demo_app();
    let mut paths: Vec<&str> = app.routes().paths().collect();
    paths.sort_unstable();
    assert_eq!(
        paths,
        vec!["/demo/add.json", "/demo/query.json", "/demo/remove.json"]
    );
}

#[test]
fn add_sums_its_parameters() {
    let app = demo_app();
    let body = dispatch(
        &app,
        RequestContext::new("/demo/add.json")
            .with_param("a", "3")
            .with_param("b", "4"),
    );
    assert_eq!(body.as_deref(), Some("3+4=7"));
}

#[test]
fn query_greets_through_the_injected_service() {
    let app = demo_app();
    let body = dispatch(
        &app,
        RequestContext::new("/demo/query.json").with_param("name", "dp"),
    );
    assert_eq!(body.as_deref(), Some("Hello, dp!"));
}

#[test]
fn remove_answers_with_an_empty_response() {
    let app = demo_app();
    let body = dispatch(
        &app,
        RequestContext::new("/demo/remove.json").with_param("id", "7"),
    );
    assert_eq!(body, None);
}

#[test]
fn unknown_path_is_not_found() {
    let app = demo_app();
    let body = dispatch(&app, RequestContext::new("/nope"));
    assert_eq!(body.as_deref(), Some(NOT_FOUND_BODY));
}
