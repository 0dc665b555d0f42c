//! Output format negotiation for read endpoints
//!
//! `?format=json` (the default) and `?format=xml` select an [`Encoder`];
//! any other value is rejected with `Unknown data format`.

use std::str::FromStr;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Serialization strategy for one output format
pub trait Encoder {
    const CONTENT_TYPE: &'static str;

    fn encode_one<T: Serialize>(value: &T) -> AppResult<String>;

    fn encode_many<T: Serialize>(values: &[T]) -> AppResult<String>;
}

pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    const CONTENT_TYPE: &'static str = "application/json";

    fn encode_one<T: Serialize>(value: &T) -> AppResult<String> {
        serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
    }

    fn encode_many<T: Serialize>(values: &[T]) -> AppResult<String> {
        serde_json::to_string(values).map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// XML documents rooted at `<response>`; lists put each element in an `<item>`.
pub struct XmlEncoder;

const XML_ROOT: &str = "response";
const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

#[derive(Serialize)]
struct XmlList<'a, T> {
    item: &'a [T],
}

impl XmlEncoder {
    fn document<T: Serialize>(value: &T) -> AppResult<String> {
        let body = quick_xml::se::to_string_with_root(XML_ROOT, value)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(format!("{}{}\n", XML_DECLARATION, body))
    }
}

impl Encoder for XmlEncoder {
    const CONTENT_TYPE: &'static str = "application/xml";

    fn encode_one<T: Serialize>(value: &T) -> AppResult<String> {
        Self::document(value)
    }

    fn encode_many<T: Serialize>(values: &[T]) -> AppResult<String> {
        Self::document(&XmlList { item: values })
    }
}

/// Format requested through the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Json,
    Xml,
}

impl FromStr for DataFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(DataFormat::Json),
            "xml" => Ok(DataFormat::Xml),
            _ => Err(AppError::UnknownFormat),
        }
    }
}

impl DataFormat {
    /// Absent means JSON; present but unrecognized (including empty) is an error.
    pub fn from_param(param: Option<&str>) -> AppResult<Self> {
        param.map_or(Ok(DataFormat::Json), str::parse)
    }

    /// Render a single value with status 200
    pub fn one<T: Serialize>(self, value: &T) -> AppResult<Response> {
        match self {
            DataFormat::Json => render::<JsonEncoder>(JsonEncoder::encode_one(value)?),
            DataFormat::Xml => render::<XmlEncoder>(XmlEncoder::encode_one(value)?),
        }
    }

    /// Render a list with status 200
    pub fn many<T: Serialize>(self, values: &[T]) -> AppResult<Response> {
        match self {
            DataFormat::Json => render::<JsonEncoder>(JsonEncoder::encode_many(values)?),
            DataFormat::Xml => render::<XmlEncoder>(XmlEncoder::encode_many(values)?),
        }
    }
}

fn render<E: Encoder>(body: String) -> AppResult<Response> {
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, E::CONTENT_TYPE)], body).into_response())
}
