//! HTML views (Tera)

use serde::Serialize;
use tera::{Context, Tera};

use predictor_core::constants::APP_NAME;
use predictor_core::{FeatureVector, FieldKind, Prediction, FEATURE_SPECS};

use crate::models::{FieldErrors, PredictionForm};

const INDEX_TEMPLATE: &str = "index.html";

/// Build the template registry; templates are compiled into the binary
pub fn create_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
    Ok(tera)
}

#[derive(Debug, Serialize)]
struct FieldView {
    name: &'static str,
    label: &'static str,
    min: String,
    max: String,
    step: String,
    value: String,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    feature: &'static str,
    value: String,
}

/// What the page shows besides the inputs
#[derive(Debug, Default)]
pub struct PageState<'a> {
    pub errors: Option<&'a FieldErrors>,
    pub result: Option<(&'a FeatureVector, &'a Prediction)>,
}

fn field_views(form: &PredictionForm, errors: Option<&FieldErrors>) -> Vec<FieldView> {
    let values = [
        form.global_reactive_power,
        form.voltage,
        form.global_intensity,
        form.sub_metering_1,
        form.sub_metering_2,
        form.sub_metering_3,
        form.hour as f64,
        form.day as f64,
        form.month as f64,
        form.dayofweek as f64,
        form.is_weekend as f64,
    ];

    FEATURE_SPECS
        .iter()
        .zip(values)
        .map(|(spec, value)| FieldView {
            name: spec.name,
            label: spec.label,
            min: spec.format_value(spec.min),
            max: spec.format_value(spec.max),
            step: match spec.kind {
                FieldKind::Float => "0.001".to_string(),
                FieldKind::Integer => "1".to_string(),
            },
            value: spec.format_value(value),
            error: errors.and_then(|e| e.get(spec.name).cloned()),
        })
        .collect()
}

/// Render the single page
pub fn render_index(tera: &Tera, form: &PredictionForm, state: PageState<'_>) -> tera::Result<String> {
    let mut context = Context::new();
    context.insert("app_name", APP_NAME);
    context.insert("fields", &field_views(form, state.errors));

    if let Some((features, prediction)) = state.result {
        let summary: Vec<SummaryRow> = features
            .summary_rows()
            .into_iter()
            .map(|(feature, value)| SummaryRow { feature, value })
            .collect();
        context.insert("summary", &summary);
        context.insert("prediction", &prediction.display_kw());
    }

    tera.render(INDEX_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_form() -> PredictionForm {
        PredictionForm::from(&FeatureVector::default())
    }

    #[test]
    fn test_render_empty_form() {
        let tera = create_templates().unwrap();
        let html = render_index(&tera, &default_form(), PageState::default()).unwrap();

        assert!(html.contains("Energy Consumption Prediction (kW)"));
        assert!(html.contains(r#"name="voltage""#));
        assert!(html.contains(r#"value="240.000""#));
        assert!(html.contains("Predict Energy Consumption"));
        assert!(!html.contains("Input Summary"));
    }

    #[test]
    fn test_render_result() {
        let tera = create_templates().unwrap();
        let features = FeatureVector::default();
        let prediction = Prediction { log_value: 0.0, kilowatts: 0.0, inference_time_us: 1 };
        let state = PageState {
            errors: None,
            result: Some((&features, &prediction)),
        };

        let html = render_index(&tera, &default_form(), state).unwrap();
        assert!(html.contains("Input Summary"));
        assert!(html.contains("<td>Sub Metering 3 (Wh)</td><td>10.000</td>"));
        assert!(html.contains("Predicted Energy Consumption: <strong>0.000 kW</strong>"));
    }

    #[test]
    fn test_render_field_error() {
        let tera = create_templates().unwrap();
        let mut errors = FieldErrors::new();
        errors.insert("hour".to_string(), "Hour of Day must be between 0 and 23".to_string());
        let state = PageState {
            errors: Some(&errors),
            result: None,
        };

        let html = render_index(&tera, &default_form(), state).unwrap();
        assert!(html.contains("Hour of Day must be between 0 and 23"));
    }
}
