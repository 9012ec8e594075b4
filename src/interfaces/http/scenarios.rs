use super::{add_log, error_response, HttpState};
use crate::domain::test_case::{AdditionalCase, CaseSnapshot, QaInsight};
use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

#[derive(Deserialize, Validate)]
pub struct ScenarioRequest {
    #[validate(length(min = 1))]
    pub intent: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalStepsRequest {
    pub additional_test_case: AdditionalCase,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    pub test_case: CaseSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    pub qa_insight: QaInsight,
}

#[post("/scenarios")]
pub async fn generate_scenario(
    data: web::Data<HttpState>,
    req: web::Json<ScenarioRequest>,
) -> impl Responder {
    if req.validate().is_err() || req.intent.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Missing or invalid test intent" }));
    }

    let intent = req.intent.trim();
    add_log(
        &data.logs,
        "INFO",
        "Scenarios",
        &format!("Generating scenario for intent: {}", intent),
    );

    match data
        .scenario_use_case
        .generate_scenario_with_retry(intent)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Scenarios",
                &format!("Scenario generation failed: {}", e),
            );
            error_response("Failed to generate QA analysis", &e)
        }
    }
}

#[post("/scenarios/additional/steps")]
pub async fn generate_additional_steps(
    data: web::Data<HttpState>,
    req: web::Json<AdditionalStepsRequest>,
) -> impl Responder {
    let case = &req.additional_test_case;
    add_log(
        &data.logs,
        "INFO",
        "Scenarios",
        &format!("Generating steps for {} ({})", case.id, case.case_type),
    );

    match data
        .scenario_use_case
        .generate_steps(case.case_type, &case.title, &case.description)
        .await
    {
        Ok(fill) => HttpResponse::Ok().json(fill),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Scenarios",
                &format!("Step generation failed: {}", e),
            );
            error_response("Failed to generate test steps", &e)
        }
    }
}

#[post("/scenarios/insight")]
pub async fn generate_insight(
    data: web::Data<HttpState>,
    req: web::Json<InsightRequest>,
) -> impl Responder {
    let case = &req.test_case;
    add_log(
        &data.logs,
        "INFO",
        "Scenarios",
        &format!("Generating insight for {} ({})", case.title, case.case_type),
    );

    match data
        .scenario_use_case
        .generate_insight(case.case_type, &case.title, &case.description)
        .await
    {
        Ok(qa_insight) => HttpResponse::Ok().json(InsightResponse { qa_insight }),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Scenarios",
                &format!("Insight generation failed: {}", e),
            );
            error_response("Failed to generate QA insight", &e)
        }
    }
}
