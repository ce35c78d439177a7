//! Login gate handler.
//!
//! GET /login — without credentials, render the login form (optionally with
//! an "unauthorized" or "invalid login" message). With the form's
//! credential fields present, validate them upstream and either set the
//! ticket cookie + redirect, or re-render the form with the failure
//! message. The form round trip carries an optional `back` URL for the
//! post-login redirect.

use crate::handlers::client_ip;
use crate::RuntimeSettings;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use jobdeck_auth::{AuthError, LoginGate, LoginOutcome, LoginPrompt};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    login_form_user: Option<String>,
    login_form_pass: Option<String>,
    back: Option<String>,
    /// Set when the front-end bounced a ticket that lacked the needed
    /// project token.
    unauth: Option<String>,
}

pub async fn login_handler(
    req: HttpRequest,
    gate: web::Data<LoginGate>,
    settings: web::Data<RuntimeSettings>,
    query: web::Query<LoginQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let back = query.back.as_deref();

    let Some(username) = query.login_form_user.as_deref() else {
        let prompt = gate.challenge(query.unauth.is_some(), back);
        return login_form(&prompt);
    };
    let password = query.login_form_pass.as_deref().unwrap_or_default();
    let ip = client_ip(&req, settings.ignore_client_ip);

    match gate.submit(username, password, ip, back, Utc::now()).await {
        Ok(LoginOutcome::Authenticated { ticket, redirect }) => {
            let cookie = gate.cookie.build(&ticket);
            no_cache(HttpResponse::Found())
                .insert_header(("Location", redirect))
                .cookie(cookie)
                .finish()
        }
        Ok(LoginOutcome::Rejected(prompt)) => login_form(&prompt),
        Err(AuthError::IdentityServiceUnavailable(detail)) => {
            log::error!("identity service unavailable: {}", detail);
            login_form(&LoginPrompt {
                message: Some(
                    "The login service is temporarily unavailable. Please try again later."
                        .to_string(),
                ),
                back: back.map(str::to_string),
            })
        }
        Err(err) => {
            log::error!("login failed unexpectedly: {}", err);
            login_form(&LoginPrompt {
                message: Some("Invalid login".to_string()),
                back: back.map(str::to_string),
            })
        }
    }
}

/// Render the login form. Deliberately minimal markup; real styling lives
/// with the external renderer, but the gate must stand alone.
fn login_form(prompt: &LoginPrompt) -> HttpResponse {
    let message = prompt
        .message
        .as_deref()
        .map(|m| format!("<div id=\"message\"><b>{}</b></div>", escape_html(m)))
        .unwrap_or_default();
    let back = prompt
        .back
        .as_deref()
        .map(|b| {
            format!(
                "<input type=\"hidden\" name=\"back\" value=\"{}\"/>",
                escape_html(b)
            )
        })
        .unwrap_or_default();
    let body = format!(
        "<html><head><title>Job Console Login</title></head><body><dialog open>\
         {message}\
         <h3>Please login</h3>\
         <form action=\"login\" method=\"get\">\
         <label for=\"login_form_user\">username:</label>\
         <input type=\"text\" name=\"login_form_user\" id=\"login_form_user\" autofocus>\
         <label for=\"login_form_pass\">password:</label>\
         <input type=\"password\" name=\"login_form_pass\" id=\"login_form_pass\"/>\
         {back}\
         <button type=\"submit\" name=\"submit\" value=\"go\">Login</button>\
         </form></dialog></body></html>"
    );
    no_cache(HttpResponse::Ok())
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Login pages must never be cached: they hold one-shot messages and the
/// redirect that sets the cookie.
fn no_cache(mut builder: actix_web::HttpResponseBuilder) -> actix_web::HttpResponseBuilder {
    builder.insert_header(("Cache-Control", "no-store, no-cache, must-revalidate"));
    builder.insert_header(("Pragma", "no-cache"));
    builder.insert_header(("Expires", "Mon, 26 Jul 1997 05:00:00 GMT"));
    builder
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
