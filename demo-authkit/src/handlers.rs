use askama::Template;
use axum::{http::StatusCode, response::Html};

use authkit_session_axum::AuthUser;

#[derive(Template)]
#[template(path = "index_user.j2")]
struct IndexTemplateUser<'a> {
    message: &'a str,
}

#[derive(Template)]
#[template(path = "index_anon.j2")]
struct IndexTemplateAnon<'a> {
    message: &'a str,
}

#[derive(Template)]
#[template(path = "account.j2")]
struct AccountTemplate {
    user: AuthUser,
}

fn render(template: impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template
        .render()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub(crate) async fn index(user: Option<AuthUser>) -> Result<Html<String>, (StatusCode, String)> {
    match user {
        Some(u) => {
            let message = format!("Welcome back, {}!", u.name);
            render(IndexTemplateUser { message: &message })
        }
        None => render(IndexTemplateAnon {
            message: "You are not signed in.",
        }),
    }
}

pub(crate) async fn account(user: AuthUser) -> Result<Html<String>, (StatusCode, String)> {
    tracing::trace!("Account page for {} in session {}", user.id, user.session_id);
    render(AccountTemplate { user })
}
