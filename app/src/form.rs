//! The HTML form at `/`.
//!
//! A successful submission stores the prediction in the visitor's session and
//! redirects back to the form (Post/Redirect/Get), which then displays it.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use iris::Measurements;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::Result;
use crate::session;
use crate::ui;

/// Neighbour counts offered by the form.
pub const NEIGHBOR_CHOICES: [usize; 5] = [2, 3, 4, 5, 6];

const REQUIRED: &str = "This field is required.";
const NOT_A_DECIMAL: &str = "Not a valid decimal value.";
const NOT_A_CHOICE: &str = "Not a valid choice.";

pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Raw form fields as submitted. Kept as strings so they can be echoed back
/// when validation fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub n_neighb: String,
    #[serde(default)]
    pub sepal_length: String,
    #[serde(default)]
    pub sepal_width: String,
    #[serde(default)]
    pub petal_length: String,
    #[serde(default)]
    pub petal_width: String,
}

impl FormInput {
    /// Checks that every field is present, the measurements are decimals and
    /// the neighbour count is one of [`NEIGHBOR_CHOICES`].
    pub fn validate(&self) -> std::result::Result<(Measurements, usize), FieldErrors> {
        let mut errors = FieldErrors::new();

        let k = match self.n_neighb.trim().parse::<usize>() {
            Ok(k) if NEIGHBOR_CHOICES.contains(&k) => Some(k),
            _ => {
                errors.insert("n_neighb", NOT_A_CHOICE);
                None
            }
        };

        let mut decimal = |name: &'static str, raw: &str| -> Option<f64> {
            let raw = raw.trim();
            if raw.is_empty() {
                errors.insert(name, REQUIRED);
                return None;
            }
            match raw.parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.insert(name, NOT_A_DECIMAL);
                    None
                }
            }
        };
        let sepal_length = decimal("sepal_length", &self.sepal_length);
        let sepal_width = decimal("sepal_width", &self.sepal_width);
        let petal_length = decimal("petal_length", &self.petal_length);
        let petal_width = decimal("petal_width", &self.petal_width);

        match (k, sepal_length, sepal_width, petal_length, petal_width) {
            (Some(k), Some(sl), Some(sw), Some(pl), Some(pw)) => {
                Ok((Measurements::new(sl, sw, pl, pw), k))
            }
            _ => Err(errors),
        }
    }
}

/// `GET /`: the empty form plus the session's last prediction, if any.
pub async fn show(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Html<String>> {
    let last = session::session_id(&jar).and_then(|id| state.sessions.last_prediction(&id));
    ui::render_model(
        &state.templates,
        &FormInput::default(),
        &FieldErrors::new(),
        last.as_ref(),
    )
}

/// `POST /`: validates the form, predicts, remembers the result and redirects.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(input): Form<FormInput>,
) -> Result<Response> {
    let (measurements, k) = match input.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(?errors, "form validation failed");
            let last =
                session::session_id(&jar).and_then(|id| state.sessions.last_prediction(&id));
            return Ok(
                ui::render_model(&state.templates, &input, &errors, last.as_ref())?.into_response(),
            );
        }
    };

    let result = match iris::predict(&state.dataset, measurements, k) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!("form prediction failed: {}", err);
            return ui::render_error(&state.templates, StatusCode::BAD_REQUEST);
        }
    };
    tracing::info!(k, prediction = %result.prediction, "form prediction");

    let id = session::session_id(&jar).unwrap_or_else(Uuid::new_v4);
    state.sessions.store(id, result);

    Ok((jar.add(session::session_cookie(&id)), Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(values: [&str; 5]) -> FormInput {
        FormInput {
            n_neighb: values[0].to_string(),
            sepal_length: values[1].to_string(),
            sepal_width: values[2].to_string(),
            petal_length: values[3].to_string(),
            petal_width: values[4].to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let (m, k) = input(["4", "5.10", "3.5", "1.4", "0.2"]).validate().unwrap();
        assert_eq!(k, 4);
        assert_eq!(m, Measurements::new(5.1, 3.5, 1.4, 0.2));
    }

    #[test]
    fn test_every_field_is_reported() {
        let errors = input(["", "", "x", "1.0", ""]).validate().unwrap_err();
        assert_eq!(errors.get("n_neighb"), Some(&NOT_A_CHOICE));
        assert_eq!(errors.get("sepal_length"), Some(&REQUIRED));
        assert_eq!(errors.get("sepal_width"), Some(&NOT_A_DECIMAL));
        assert_eq!(errors.get("petal_length"), None);
        assert_eq!(errors.get("petal_width"), Some(&REQUIRED));
    }

    #[test]
    fn test_neighbor_count_outside_choices() {
        for k in ["1", "7", "0", "-2", "3.0"] {
            let errors = input([k, "5.1", "3.5", "1.4", "0.2"]).validate().unwrap_err();
            assert_eq!(errors.len(), 1, "{:?}", k);
            assert!(errors.contains_key("n_neighb"));
        }
    }
}
