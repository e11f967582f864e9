use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use diesel::prelude::*;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

use super::generator::GeneratedEmail;
use super::EmailError;
use crate::auth::AuthenticatedUser;
use crate::shared::models::templates;
use crate::shared::state::AppState;
use crate::templates::TEMPLATE_KIND_EMAIL;

#[derive(Debug, Deserialize)]
pub struct GenerateEmailRequest {
    pub template_id: Option<Uuid>,
    pub recipient_name: Option<String>,
    pub product: Option<String>,
    pub tone: Option<String>,
    /// Free-text bullet points the email must cover.
    pub points: Vec<String>,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new().route("/api/email/generate", post(generate_email))
}

pub async fn generate_email(
    State(state): State<Arc<AppState>>,
    _user: AuthenticatedUser,
    Json(request): Json<GenerateEmailRequest>,
) -> Result<Json<GeneratedEmail>, EmailError> {
    if request.points.iter().all(|p| p.trim().is_empty()) {
        return Err(EmailError::Validation(
            "at least one content point is required".to_string(),
        ));
    }

    let template = match request.template_id {
        Some(template_id) => {
            let mut conn = state.conn.get().map_err(|_| EmailError::DatabaseConnection)?;
            let row: Option<(Option<String>, Option<String>)> = templates::table
                .find(template_id)
                .filter(templates::kind.eq(TEMPLATE_KIND_EMAIL))
                .filter(templates::is_active.eq(true))
                .select((templates::subject, templates::body))
                .first(&mut conn)
                .optional()
                .map_err(|e| EmailError::Database(e.to_string()))?;
            Some(row.ok_or_else(|| {
                EmailError::Validation("template not found or not an email template".to_string())
            })?)
        }
        None => None,
    };

    let prompt = build_prompt(&request, template.as_ref());
    let email = state.generator.generate(&prompt).await?;
    Ok(Json(email))
}

fn build_prompt(
    request: &GenerateEmailRequest,
    template: Option<&(Option<String>, Option<String>)>,
) -> String {
    let mut prompt = String::from(
        "Write a professional sales email. Respond with a JSON object \
         {\"subject\": ..., \"body\": ...} and nothing else.\n",
    );
    if let Some(name) = request.recipient_name.as_deref() {
        let _ = writeln!(prompt, "Recipient: {name}");
    }
    if let Some(product) = request.product.as_deref() {
        let _ = writeln!(prompt, "Product: {product}");
    }
    if let Some(tone) = request.tone.as_deref() {
        let _ = writeln!(prompt, "Tone: {tone}");
    }
    if let Some((subject, body)) = template {
        if let Some(subject) = subject.as_deref() {
            let _ = writeln!(prompt, "Base the subject on: {subject}");
        }
        if let Some(body) = body.as_deref() {
            let _ = writeln!(prompt, "Use this template as a starting point:\n{body}");
        }
    }
    prompt.push_str("The email must cover these points:\n");
    for point in request.points.iter().filter(|p| !p.trim().is_empty()) {
        let _ = writeln!(prompt, "- {}", point.trim());
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_points_and_recipient() {
        let request = GenerateEmailRequest {
            template_id: None,
            recipient_name: Some("Ada".to_string()),
            product: None,
            tone: Some("warm".to_string()),
            points: vec!["pricing update".to_string(), "  ".to_string()],
        };
        let prompt = build_prompt(&request, None);
        assert!(prompt.contains("Recipient: Ada"));
        assert!(prompt.contains("Tone: warm"));
        assert!(prompt.contains("- pricing update"));
        assert!(!prompt.contains("-  \n"));
    }

    #[test]
    fn test_prompt_embeds_template_body() {
        let request = GenerateEmailRequest {
            template_id: None,
            recipient_name: None,
            product: None,
            tone: None,
            points: vec!["renewal".to_string()],
        };
        let template = (Some("Renewal time".to_string()), Some("Dear customer".to_string()));
        let prompt = build_prompt(&request, Some(&template));
        assert!(prompt.contains("Base the subject on: Renewal time"));
        assert!(prompt.contains("Dear customer"));
    }
}
