//! Form handlers (server-rendered page)

use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

use predictor_core::FeatureVector;

use crate::models::PredictionForm;
use crate::views::{self, PageState};
use crate::{AppResult, AppState};

/// Show the form with its default values
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let form = PredictionForm::from(&FeatureVector::default());
    let html = views::render_index(&state.templates, &form, PageState::default())?;
    Ok(Html(html))
}

/// Parse, validate, predict, and render the summary + result
pub async fn submit(
    State(state): State<AppState>,
    Form(raw): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let parsed = PredictionForm::from_raw(&raw)
        .and_then(|form| form.clone().into_features().map_err(|errors| (form, errors)));

    let (form, features) = match parsed {
        Ok(features) => (PredictionForm::from(&features), features),
        Err((form, errors)) => {
            tracing::debug!("Form rejected: {:?}", errors);
            let page = PageState {
                errors: Some(&errors),
                result: None,
            };
            let html = views::render_index(&state.templates, &form, page)?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    let prediction = state.predictor.predict(&features)?;
    tracing::info!(
        kilowatts = prediction.kilowatts,
        inference_time_us = prediction.inference_time_us,
        "Prediction served"
    );

    let page = PageState {
        errors: None,
        result: Some((&features, &prediction)),
    };
    let html = views::render_index(&state.templates, &form, page)?;
    Ok(Html(html).into_response())
}
