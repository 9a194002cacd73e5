//! Pure judgement of responses against catalog expectations.

use log::warn;
use serde_json::Value;

use super::error::CheckError;
use crate::catalog::template::{lookup, render};
use crate::catalog::{BodyShape, EndpointCheck, Expectation, LoginCheck};
use crate::client::ApiResponse;

/// Message and details of a passed check
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub message: String,
    pub details: Option<String>,
}

/// Successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub outcome: Outcome,
}

pub fn evaluate_login(
    login: &LoginCheck,
    role: &str,
    response: &ApiResponse,
) -> Result<LoginOutcome, CheckError> {
    if response.status != login.status {
        return Err(CheckError::UnexpectedStatus {
            status: response.status,
            snippet: response.snippet(),
        });
    }

    let body = response.json().map_err(|e| CheckError::MalformedBody {
        reason: format!("not valid JSON ({})", e),
        snippet: response.snippet(),
    })?;

    let token = lookup(&body, &login.token_field).and_then(Value::as_str);
    let user = lookup(&body, &login.user_field).filter(|u| u.is_object());
    let (token, user) = match (token, user) {
        (Some(token), Some(user)) => (token, user),
        _ => {
            return Err(CheckError::MissingCredentials {
                snippet: response.snippet(),
            })
        }
    };

    if let Some(reported) = user.get("role").and_then(Value::as_str) {
        if reported != role {
            warn!(
                "login for role '{}' returned a user with role '{}'",
                role, reported
            );
        }
    }

    Ok(LoginOutcome {
        token: token.to_string(),
        outcome: render_outcome(&login.message, login.details.as_deref(), &body),
    })
}

pub fn evaluate_check(
    check: &EndpointCheck,
    role: &str,
    response: &ApiResponse,
) -> Result<Outcome, CheckError> {
    match check.expectation_for(role) {
        Expectation::Denied { status } => {
            if response.status == status {
                let note = check.access.as_ref().map(|rule| rule.denial_note());
                Ok(Outcome {
                    message: format!("Correctly denied access ({})", status),
                    details: note,
                })
            } else {
                Err(CheckError::AccessNotDenied {
                    expected: status,
                    status: response.status,
                    snippet: response.snippet(),
                })
            }
        }
        Expectation::Allowed { status } => {
            if response.status != status {
                return Err(CheckError::UnexpectedStatus {
                    status: response.status,
                    snippet: response.snippet(),
                });
            }
            let body = parse_body(check, response)?;
            Ok(render_outcome(&check.message, check.details.as_deref(), &body))
        }
    }
}

fn parse_body(check: &EndpointCheck, response: &ApiResponse) -> Result<Value, CheckError> {
    let strict = check.shape != BodyShape::Any || !check.require.is_empty();

    let body = match response.json() {
        Ok(body) => body,
        // Unstructured bodies are fine when nothing is asserted on them
        Err(_) if !strict => Value::String(response.body.clone()),
        Err(e) => {
            return Err(CheckError::MalformedBody {
                reason: format!("not valid JSON ({})", e),
                snippet: response.snippet(),
            })
        }
    };

    if !check.shape.matches(&body) {
        return Err(CheckError::MalformedBody {
            reason: format!("expected {}", check.shape.describe()),
            snippet: response.snippet(),
        });
    }

    if let Some(missing) = check.require.iter().find(|f| lookup(&body, f).is_none()) {
        return Err(CheckError::MalformedBody {
            reason: format!("missing field '{}'", missing),
            snippet: response.snippet(),
        });
    }

    Ok(body)
}

fn render_outcome(message: &str, details: Option<&str>, body: &Value) -> Outcome {
    Outcome {
        message: render(message, body),
        details: details.map(|t| render(t, body)),
    }
}
