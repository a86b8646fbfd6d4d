use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use iris::PredictionResult;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::error::Result;
use crate::form::{FormInput, NEIGHBOR_CHOICES};

const MODEL_TEMPLATE: &str = "model.html";
const ERROR_TEMPLATE: &str = "404.html";

/// Label shown next to each measurement input, in form order.
const MEASUREMENT_FIELDS: [(&str, &str); 4] = [
    ("sepal_length", "Sepal Length (cm):"),
    ("sepal_width", "Sepal Width (cm):"),
    ("petal_length", "Petal Length (cm):"),
    ("petal_width", "Petal Width (cm):"),
];

/// Builds the template environment with both pages compiled in.
pub fn environment() -> std::result::Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(MODEL_TEMPLATE, include_str!("../templates/model.html"))?;
    env.add_template(ERROR_TEMPLATE, include_str!("../templates/404.html"))?;
    Ok(env)
}

/// A stored prediction, formatted for display with two decimal places.
#[derive(Debug, Serialize)]
struct LastPrediction {
    sepal_length: String,
    sepal_width: String,
    petal_length: String,
    petal_width: String,
    n_neighbors: usize,
    prediction: String,
}

impl From<&PredictionResult> for LastPrediction {
    fn from(result: &PredictionResult) -> Self {
        Self {
            sepal_length: format!("{:.2}", result.sepal_length),
            sepal_width: format!("{:.2}", result.sepal_width),
            petal_length: format!("{:.2}", result.petal_length),
            petal_width: format!("{:.2}", result.petal_width),
            n_neighbors: result.n_neighbors,
            prediction: result.prediction.clone(),
        }
    }
}

/// Renders the form page with the submitted values, any field errors and the
/// last prediction of the session.
pub fn render_model(
    env: &Environment<'static>,
    form: &FormInput,
    errors: &BTreeMap<&'static str, &'static str>,
    last: Option<&PredictionResult>,
) -> Result<Html<String>> {
    let page = env.get_template(MODEL_TEMPLATE)?.render(context! {
        form => form,
        errors => errors,
        fields => MEASUREMENT_FIELDS,
        choices => NEIGHBOR_CHOICES,
        last => last.map(LastPrediction::from),
    })?;
    Ok(Html(page))
}

/// Renders the error page with the given status.
pub fn render_error(env: &Environment<'static>, status: StatusCode) -> Result<Response> {
    let page = env.get_template(ERROR_TEMPLATE)?.render(context! {
        status => status.as_u16(),
        reason => status.canonical_reason().unwrap_or("Error"),
    })?;
    Ok((status, Html(page)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        let env = environment().unwrap();
        assert!(env.get_template(MODEL_TEMPLATE).is_ok());
        assert!(env.get_template(ERROR_TEMPLATE).is_ok());
    }

    #[test]
    fn test_model_page_shows_last_prediction() {
        let env = environment().unwrap();
        let last = PredictionResult {
            sepal_length: 5.1,
            sepal_width: 3.5,
            petal_length: 1.4,
            petal_width: 0.2,
            n_neighbors: 3,
            prediction: "Setosa".to_string(),
        };
        let Html(page) =
            render_model(&env, &FormInput::default(), &BTreeMap::new(), Some(&last)).unwrap();
        assert!(page.contains("Setosa"));
        assert!(page.contains("5.10"));
        assert!(page.contains("0.20"));
    }

    #[test]
    fn test_model_page_escapes_submitted_values() {
        let env = environment().unwrap();
        let form = FormInput {
            sepal_length: "<script>".to_string(),
            ..FormInput::default()
        };
        let mut errors = BTreeMap::new();
        errors.insert("sepal_length", "Not a valid decimal value");
        let Html(page) = render_model(&env, &form, &errors, None).unwrap();
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("Not a valid decimal value"));
    }

    #[test]
    fn test_error_page_status() {
        let env = environment().unwrap();
        let response = render_error(&env, StatusCode::NOT_FOUND).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
