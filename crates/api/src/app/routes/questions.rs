use chrono::Utc;

use storefront_core::QuestionId;

use super::ApiRequest;
use crate::app::dto::{AnswerRequest, require};
use crate::app::errors::{ApiResponse, ApiResult};
use crate::authz::OwnerScope;

/// Unanswered questions on the caller's products. No store means no questions.
pub async fn unanswered(scope: &OwnerScope<'_>) -> ApiResult {
    let Some(store) = scope.optional_store().await? else {
        return ApiResponse::ok(Vec::<()>::new());
    };
    ApiResponse::ok(scope.resources().unanswered_questions(store.id).await?)
}

pub async fn answer(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: QuestionId = req.param("id")?;
    let body: AnswerRequest = req.json()?;
    require(&[("answer", &body.answer)])?;

    let mut question = scope.answerable_question(id).await?;
    question.answer(body.answer.as_deref().unwrap_or_default(), Utc::now())?;
    scope.resources().update_question(&question).await?;

    Ok(ApiResponse::ok(question)?.message("Answer posted"))
}
