//! 配置校验模块
//!
//! 校验规则：
//! - 字段取值范围 (derive 校验，错误路径形如 `media.primary.duration_s`)
//! - start_s <= duration_s
//! - 倍速预设为正且有限
//! - 脚本步骤：at_s 有限、非负且不超过 run_for_s
//! - 脚本参数：seek 目标非负，step_frame / bump_rate 方向非零，set_rate 倍速为正

use std::borrow::Cow;

use contracts::{ContractError, MediaConfig, ScenarioAction, SessionBlueprint};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// 校验 SessionBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    validate_ranges(blueprint)?;
    validate_media(&blueprint.media.primary, "media.primary")?;
    validate_media(&blueprint.media.secondary, "media.secondary")?;
    validate_presets(blueprint)?;
    validate_scenario(blueprint)?;
    Ok(())
}

/// 运行 derive 校验，并转换为带字段路径的错误
fn validate_ranges(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        let (field, message) = first_error(&errors, "")
            .unwrap_or_else(|| ("blueprint".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

/// 按字段名排序后取第一个错误，保证输出稳定
fn first_error(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut entries: Vec<(&Cow<'static, str>, &ValidationErrorsKind)> =
        errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    return Some((path, describe(err)));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_error(inner, &path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_error(inner, &format!("{path}[{idx}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

fn describe(err: &ValidationError) -> String {
    if let Some(ref message) = err.message {
        return message.to_string();
    }
    match err.params.get("value") {
        Some(value) => format!("failed '{}' check (got {value})", err.code),
        None => format!("failed '{}' check", err.code),
    }
}

/// 校验初始位置不超过媒体时长
fn validate_media(media: &MediaConfig, path: &str) -> Result<(), ContractError> {
    if media.start_s > media.duration_s {
        return Err(ContractError::config_validation(
            format!("{path}.start_s"),
            format!(
                "start_s ({}) must be <= duration_s ({})",
                media.start_s, media.duration_s
            ),
        ));
    }
    Ok(())
}

/// 校验倍速预设
fn validate_presets(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    for (idx, rate) in blueprint.playback.rate_presets.iter().enumerate() {
        if !rate.is_finite() || *rate <= 0.0 {
            return Err(ContractError::config_validation(
                format!("playback.rate_presets[{idx}]"),
                format!("rate preset must be a positive number, got {rate}"),
            ));
        }
    }
    Ok(())
}

/// 校验脚本步骤
fn validate_scenario(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let run_for = blueprint.simulation.run_for_s;

    for (idx, step) in blueprint.scenario.iter().enumerate() {
        if !step.at_s.is_finite() || step.at_s < 0.0 {
            return Err(ContractError::scenario(
                idx,
                format!("at_s must be a non-negative number, got {}", step.at_s),
            ));
        }
        if step.at_s > run_for {
            return Err(ContractError::scenario(
                idx,
                format!(
                    "at_s ({}) is after the end of the run ({run_for})",
                    step.at_s
                ),
            ));
        }
        validate_action(idx, &step.action)?;
    }
    Ok(())
}

fn validate_action(idx: usize, action: &ScenarioAction) -> Result<(), ContractError> {
    let name = action.name();
    match *action {
        ScenarioAction::Seek { time_s, .. } => {
            if !time_s.is_finite() || time_s < 0.0 {
                return Err(ContractError::scenario(
                    idx,
                    format!("{name}: time_s must be >= 0, got {time_s}"),
                ));
            }
        }
        ScenarioAction::Skip { seconds, .. }
        | ScenarioAction::Step { seconds }
        | ScenarioAction::SetOffset { seconds }
        | ScenarioAction::NudgeOffset { seconds } => {
            if !seconds.is_finite() {
                return Err(ContractError::scenario(
                    idx,
                    format!("{name}: seconds must be finite"),
                ));
            }
        }
        ScenarioAction::StepFrame { direction, .. } | ScenarioAction::BumpRate { direction } => {
            if direction == 0 {
                return Err(ContractError::scenario(
                    idx,
                    format!("{name}: direction must be non-zero"),
                ));
            }
        }
        ScenarioAction::SetRate { rate } => {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ContractError::scenario(
                    idx,
                    format!("{name}: rate must be > 0, got {rate}"),
                ));
            }
        }
        ScenarioAction::Establish
        | ScenarioAction::Play { .. }
        | ScenarioAction::Pause { .. }
        | ScenarioAction::Swap
        | ScenarioAction::Clear => {}
    }
    Ok(())
}
