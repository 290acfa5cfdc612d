use std::env;

use imagekeeper_core::{AppError, AppResult};
use imagekeeper_domain::{PassKind, ResourceTag, RetentionPolicy};
use imagekeeper_infrastructure::SlackWebhookConfig;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub region: String,
    pub backup_tag: ResourceTag,
    pub policy: RetentionPolicy,
    pub slack: Option<SlackWebhookConfig>,
    pub report_topic_arn: Option<String>,
    pub long_report_passes: Vec<PassKind>,
}

impl WorkerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = required_env(&lookup, "AWS_REGION")?;
        let backup_tag = ResourceTag::new(
            optional_env(&lookup, "BACKUP_TAG_KEY").unwrap_or_else(|| "Environment".to_owned()),
            optional_env(&lookup, "BACKUP_TAG_VALUE").unwrap_or_else(|| "production".to_owned()),
        )?;
        let policy = RetentionPolicy::new(
            parse_env_u32(&lookup, "BACKUP_HOURS", 4)?,
            parse_env_u32(&lookup, "BACKUP_HOURS_GRACE", 8)?,
            parse_env_u32(&lookup, "RETENTION_DAYS", 7)?,
            parse_env_u32(&lookup, "RETENTION_DAYS_GRACE", 8)?,
        )?;

        let slack = optional_env(&lookup, "SLACK_WEBHOOK_URL").map(|webhook_url| {
            SlackWebhookConfig {
                webhook_url,
                channel: optional_env(&lookup, "SLACK_CHANNEL").unwrap_or_else(|| "ops".to_owned()),
                icon: optional_env(&lookup, "SLACK_ICON").unwrap_or_else(|| "robot".to_owned()),
                job_name: optional_env(&lookup, "SLACK_JOB_NAME")
                    .unwrap_or_else(|| "imagekeeper".to_owned()),
            }
        });
        let report_topic_arn = optional_env(&lookup, "REPORT_TOPIC_ARN");
        let long_report_passes = parse_pass_list(
            optional_env(&lookup, "LONG_REPORT_PASSES")
                .as_deref()
                .unwrap_or("audit"),
        )?;

        Ok(Self {
            region,
            backup_tag,
            policy,
            slack,
            report_topic_arn,
            long_report_passes,
        })
    }

    pub fn sends_long_form(&self, pass: PassKind) -> bool {
        self.long_report_passes.contains(&pass)
    }
}

pub fn parse_pass(argument: Option<String>) -> AppResult<PassKind> {
    argument
        .ok_or_else(|| {
            AppError::Validation("usage: imagekeeper-worker <create|audit|prune>".to_owned())
        })?
        .parse()
}

fn parse_pass_list(value: &str) -> AppResult<Vec<PassKind>> {
    let mut passes = Vec::new();
    for item in value.split(',').filter(|item| !item.trim().is_empty()) {
        let pass = item.parse::<PassKind>().map_err(|error| {
            AppError::Validation(format!("invalid LONG_REPORT_PASSES value: {error}"))
        })?;
        if !passes.contains(&pass) {
            passes.push(pass);
        }
    }

    Ok(passes)
}

fn optional_env<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_env<F>(lookup: &F, name: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional_env(lookup, name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32<F>(lookup: &F, name: &str, default: u32) -> AppResult<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match optional_env(lookup, name) {
        Some(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use imagekeeper_core::AppError;
    use imagekeeper_domain::{PassKind, RetentionPolicy};

    use super::{WorkerConfig, parse_pass};

    fn load(vars: &[(&str, &str)]) -> Result<WorkerConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        WorkerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_region_is_set() {
        let config = load(&[("AWS_REGION", "us-east-1")]);
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.backup_tag.key(), "Environment");
        assert_eq!(config.backup_tag.value(), "production");
        assert_eq!(config.policy, RetentionPolicy::default());
        assert!(config.slack.is_none());
        assert!(config.report_topic_arn.is_none());
        assert!(config.sends_long_form(PassKind::Audit));
        assert!(!config.sends_long_form(PassKind::Prune));
    }

    #[test]
    fn region_is_required() {
        assert!(matches!(load(&[]), Err(AppError::Validation(_))));
        assert!(matches!(
            load(&[("AWS_REGION", "  ")]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = load(&[("AWS_REGION", "us-east-1"), ("RETENTION_DAYS", "seven")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn oversized_retention_is_rejected_at_load() {
        let result = load(&[
            ("AWS_REGION", "us-east-1"),
            ("RETENTION_DAYS", "100000000"),
            ("RETENTION_DAYS_GRACE", "100000000"),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn grace_shorter_than_cadence_is_rejected() {
        let result = load(&[
            ("AWS_REGION", "us-east-1"),
            ("BACKUP_HOURS", "12"),
            ("BACKUP_HOURS_GRACE", "6"),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn slack_settings_follow_webhook_url() {
        let config = load(&[
            ("AWS_REGION", "eu-west-1"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.test/services/T/B/X"),
            ("SLACK_CHANNEL", "backups"),
        ])
        .unwrap_or_else(|_| unreachable!());

        let slack = config.slack.unwrap_or_else(|| unreachable!());
        assert_eq!(slack.channel, "backups");
        assert_eq!(slack.icon, "robot");
        assert_eq!(slack.job_name, "imagekeeper");
    }

    #[test]
    fn long_report_passes_are_parsed_from_a_comma_list() {
        let config = load(&[
            ("AWS_REGION", "us-east-1"),
            ("LONG_REPORT_PASSES", "audit, Prune,audit,"),
        ])
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            config.long_report_passes,
            vec![PassKind::Audit, PassKind::Prune]
        );
        assert!(matches!(
            load(&[("AWS_REGION", "us-east-1"), ("LONG_REPORT_PASSES", "weekly")]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn pass_argument_is_required_and_parsed() {
        assert!(matches!(parse_pass(None), Err(AppError::Validation(_))));
        assert_eq!(
            parse_pass(Some("prune".to_owned())).unwrap_or_else(|_| unreachable!()),
            PassKind::Prune
        );
    }
}
