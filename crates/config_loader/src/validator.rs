//! 配置校验模块
//!
//! 校验规则：
//! - monitor.report_interval_ms > 0
//! - bench.consumers / bench.sources / bench.commit_every > 0
//! - bench.fail_every (如设置) > 0
//! - observability.log_level 非空

use contracts::{ContractError, RuntimeConfig};

/// 校验 RuntimeConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &RuntimeConfig) -> Result<(), ContractError> {
    validate_observability(config)?;
    validate_monitor(config)?;
    validate_bench(config)?;
    Ok(())
}

/// 校验日志配置
fn validate_observability(config: &RuntimeConfig) -> Result<(), ContractError> {
    if config.observability.log_level.trim().is_empty() {
        return Err(ContractError::config_validation(
            "observability.log_level",
            "log_level cannot be empty",
        ));
    }
    Ok(())
}

/// 校验上报窗口
fn validate_monitor(config: &RuntimeConfig) -> Result<(), ContractError> {
    if config.monitor.report_interval_ms == 0 {
        return Err(ContractError::config_validation(
            "monitor.report_interval_ms",
            "report_interval_ms must be > 0",
        ));
    }
    Ok(())
}

/// 校验 bench stage
fn validate_bench(config: &RuntimeConfig) -> Result<(), ContractError> {
    let bench = &config.bench;

    let positive = [
        ("bench.consumers", bench.consumers as u64),
        ("bench.sources", bench.sources as u64),
        ("bench.commit_every", bench.commit_every),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ContractError::config_validation(
                field,
                format!("{} must be > 0", field.trim_start_matches("bench.")),
            ));
        }
    }

    if bench.fail_every == Some(0) {
        return Err(ContractError::config_validation(
            "bench.fail_every",
            "fail_every must be > 0 when set",
        ));
    }

    Ok(())
}
