/// Request rejection without a database
///
/// Everything here is refused by the session layer, the signed URL layer or
/// form binding before any query runs, so the router sits on a pool that
/// never connects.

mod common;

use axum::http::{header, StatusCode};
use common::{body_json, get, offline_app, post_form, TestSession};
use rollcall_api::routes::paths;

fn alice() -> TestSession {
    TestSession::new(1, "alice@example.com")
}

#[tokio::test]
async fn test_pages_require_a_session() {
    let (app, _) = offline_app();

    for uri in [
        "/contacts/index",
        "/contacts/add_contact",
        "/contacts/delete_contact/1",
        "/classes/index",
        "/classes/remove_student/1",
    ] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_forged_session_is_rejected() {
    let (app, _) = offline_app();

    let forged = TestSession {
        token: "not-a-session-token".to_string(),
        ..alice()
    };

    let response = get(&app, "/contacts/index", Some(&forged)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_routes_reject_missing_signature() {
    let (app, _) = offline_app();
    let alice = alice();

    for uri in [
        paths::edit_contact(1),
        paths::delete_contact(1),
        paths::phones(1),
        paths::edit_phone(1, 2),
        paths::delete_phone(1, 2),
        paths::remove_student(1),
    ] {
        let response = get(&app, &uri, Some(&alice)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);

        let response = post_form(&app, &uri, Some(&alice), &[]).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_signed_routes_reject_bad_signatures() {
    let (app, state) = offline_app();
    let alice = alice();

    let garbage = format!("{}?_signature=garbage", paths::delete_contact(1));
    let response = get(&app, &garbage, Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A valid token for a different contact
    let other_contact = state.signed_url(&alice.current, &paths::delete_contact(2));
    let token = other_contact.split_once('?').unwrap().1;
    let response = get(
        &app,
        &format!("{}?{}", paths::delete_contact(1), token),
        Some(&alice),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_link_from_another_session_is_rejected() {
    let (app, state) = offline_app();

    let earlier = TestSession::new(1, "alice@example.com");
    let later = TestSession::new(1, "alice@example.com");

    let link = state.signed_url(&earlier.current, &paths::delete_contact(1));
    let response = get(&app, &link, Some(&later)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_contact_form_carries_formkey() {
    let (app, state) = offline_app();
    let alice = alice();

    let response = get(&app, paths::ADD_CONTACT, Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["action"], paths::ADD_CONTACT);
    assert_eq!(body["values"]["first_name"], "");
    assert!(body["values"].get("user_email").is_none());
    assert!(body["errors"].as_array().unwrap().is_empty());

    let formkey = body["formkey"].as_str().unwrap();
    assert!(state
        .signer
        .verify_form_key(alice.current.session_id, paths::ADD_CONTACT, Some(formkey))
        .is_ok());
}

#[tokio::test]
async fn test_post_without_valid_formkey_is_forbidden() {
    let (app, state) = offline_app();
    let alice = alice();

    let response = post_form(
        &app,
        paths::ADD_CONTACT,
        Some(&alice),
        &[("first_name", "Jane"), ("last_name", "Doe")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let wrong_action = state.signer.form_key(alice.current.session_id, paths::ADD_CLASS);
    let response = post_form(
        &app,
        paths::ADD_CONTACT,
        Some(&alice),
        &[
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("_formkey", wrong_action.as_str()),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_blank_contact_is_rerendered_with_errors() {
    let (app, state) = offline_app();
    let alice = alice();
    let formkey = state.signer.form_key(alice.current.session_id, paths::ADD_CONTACT);

    let response = post_form(
        &app,
        paths::ADD_CONTACT,
        Some(&alice),
        &[("first_name", "  Jane "), ("last_name", "   "), ("_formkey", formkey.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["values"]["first_name"], "Jane");
    assert_eq!(body["errors"][0]["field"], "last_name");
    assert_eq!(body["errors"][0]["message"], "Last name must be 1 to 255 characters");
}

#[tokio::test]
async fn test_overlong_first_name_is_rerendered() {
    let (app, state) = offline_app();
    let alice = alice();
    let formkey = state.signer.form_key(alice.current.session_id, paths::ADD_CONTACT);
    let long_name = "x".repeat(300);

    let response = post_form(
        &app,
        paths::ADD_CONTACT,
        Some(&alice),
        &[
            ("first_name", long_name.as_str()),
            ("last_name", "Doe"),
            ("_formkey", formkey.as_str()),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["field"], "first_name");
    assert_eq!(body["errors"][0]["message"], "First name must be 1 to 255 characters");
}

#[tokio::test]
async fn test_blank_class_name_is_rerendered() {
    let (app, state) = offline_app();
    let alice = alice();
    let formkey = state.signer.form_key(alice.current.session_id, paths::ADD_CLASS);

    let response = post_form(
        &app,
        paths::ADD_CLASS,
        Some(&alice),
        &[("class_name", ""), ("_formkey", formkey.as_str())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_root_redirects_and_logout_clears_cookie() {
    let (app, _) = offline_app();

    let response = get(&app, "/", None).await;
    common::assert_redirect(&response, paths::CONTACTS_INDEX);

    let response = get(&app, "/auth/logout", None).await;
    common::assert_redirect(&response, "/");
    let cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("rollcall_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_register_validation_happens_before_storage() {
    let (app, _) = offline_app();

    let response = post_form(
        &app,
        "/auth/register",
        None,
        &[("email", "not-an-email"), ("password", "short")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_security_headers_on_rejections() {
    let (app, _) = offline_app();

    let response = get(&app, "/contacts/index", None).await;
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(response.headers().get("referrer-policy").unwrap(), "same-origin");
}
