use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use iris::{PredictionResult, RawQuery};

use crate::app::AppState;
use crate::error::{Result, ServerError};

/// `GET /api/v1?sepal_length=..&sepal_width=..&petal_length=..&petal_width=..&n_neighb=..`
///
/// Measurements are coerced to real numbers and the neighbour count to an
/// integer. Anything that fails coercion or is out of range is a 400.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<RawQuery>, QueryRejection>,
) -> Result<Json<PredictionResult>> {
    let Query(raw) = query.map_err(|e| ServerError::InvalidParameters(e.body_text()))?;
    let result = iris::predict_raw(&state.dataset, &raw)?;

    match serde_json::to_string(&result) {
        Ok(body) => tracing::debug!("{}", body),
        Err(err) => tracing::debug!("prediction not serializable for logging: {}", err),
    }
    Ok(Json(result))
}
