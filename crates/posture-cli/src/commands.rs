//! Non-interactive subcommands. Output goes to any writer so they can be tested.

use std::io::Write;

use anyhow::Context;
use posture_core::classify::{score_trend, RiskLevel, ScoreGrade};
use posture_core::{
    AuditAction, CreateTenantRequest, GuaranteeToggle, GuaranteeUpdate, M365Credentials,
    NewAuditEntry, PostureApi, Tenant,
};
use tracing::warn;
use validator::Validate;

pub async fn list_tenants(api: &dyn PostureApi, out: &mut impl Write) -> anyhow::Result<()> {
    let tenants = api.list_tenants().await.context("listing tenants")?;
    if tenants.is_empty() {
        writeln!(out, "No tenants")?;
        return Ok(());
    }

    writeln!(out, "{:<24} {:<30} {:<28} {}", "ID", "NAME", "DOMAIN", "M365")?;
    for tenant in &tenants {
        writeln!(
            out,
            "{:<24} {:<30} {:<28} {}",
            tenant.id,
            tenant.name,
            tenant.domain,
            if tenant.is_connected() { "connected" } else { "-" }
        )?;
    }
    Ok(())
}

pub async fn show_scores(
    api: &dyn PostureApi,
    tenant_id: &str,
    user_id: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let scores = match user_id {
        Some(user) => api.user_secure_scores(user, tenant_id).await,
        None => api.secure_scores(tenant_id).await,
    }
    .context("loading secure scores")?;

    match scores.last() {
        Some(current) => {
            let grade = ScoreGrade::from_percentage(current.percentage);
            write!(out, "Secure score: {:.1}% ({})", current.percentage, grade.description())?;
            let series: Vec<f64> = scores.iter().map(|e| e.percentage).collect();
            if let Some(trend) = score_trend(&series) {
                write!(out, " {:+.1}", trend)?;
            }
            writeln!(out)?;
        }
        None => writeln!(out, "Secure score: no data")?,
    }

    let history = api.score_history(tenant_id).await.context("loading score history")?;
    for entry in &history {
        writeln!(out, "  {} {:>6.1}%", entry.date, entry.percentage)?;
    }

    // Category reports are per user
    let Some(user) = user_id else {
        return Ok(());
    };
    let categories = [
        ("identity", api.identity_report(user, tenant_id).await.map(|r| r.score)),
        ("data", api.data_report(user, tenant_id).await.map(|r| r.score)),
        ("apps", api.apps_report(user, tenant_id).await.map(|r| r.score)),
    ];
    for (name, score) in categories {
        match score {
            Ok(score) => {
                let risk = RiskLevel::from_score(score.percentage);
                writeln!(
                    out,
                    "{:<9} {:>6.1}%  risk {:.1}% ({})",
                    name,
                    score.percentage,
                    100.0 - score.percentage,
                    risk.label()
                )?;
            }
            Err(e) => writeln!(out, "{:<9} unavailable: {}", name, e.user_message())?,
        }
    }
    Ok(())
}

pub async fn show_audit(api: &dyn PostureApi, out: &mut impl Write) -> anyhow::Result<()> {
    let entries = api.audit_logs().await.context("loading audit logs")?;
    for entry in &entries {
        writeln!(
            out,
            "{} {:<18} {:<24} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.actor,
            entry.action,
            entry.tenant_id.as_deref().unwrap_or("-"),
            entry.detail.as_deref().unwrap_or("")
        )?;
    }
    writeln!(out, "{} entries", entries.len())?;
    Ok(())
}

pub async fn create_tenant(
    api: &dyn PostureApi,
    name: &str,
    domain: &str,
    credentials: Option<M365Credentials>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let request = CreateTenantRequest::new(name, domain);
    request.validate().context("invalid tenant")?;
    if let Some(credentials) = &credentials {
        credentials.validate().context("invalid credentials")?;
    }

    let tenant = api.create_tenant(&request).await.context("creating tenant")?;
    record(
        api,
        NewAuditEntry::new(AuditAction::TenantCreated)
            .tenant(tenant.id.clone())
            .detail(tenant.domain.clone()),
        out,
    )
    .await?;
    writeln!(out, "Created tenant {} ({})", tenant.name, tenant.id)?;

    if let Some(credentials) = credentials {
        connect(api, &tenant.id, &credentials, out).await?;
    }
    Ok(())
}

pub async fn connect(
    api: &dyn PostureApi,
    tenant_id: &str,
    credentials: &M365Credentials,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    credentials.validate().context("invalid credentials")?;
    let tenant = api
        .connect_microsoft365(tenant_id, credentials)
        .await
        .context("connecting Microsoft 365")?;
    record(
        api,
        NewAuditEntry::new(AuditAction::Microsoft365Connected).tenant(tenant.id.clone()),
        out,
    )
    .await?;

    let state = if tenant.is_connected() { "connected" } else { "pending" };
    writeln!(out, "Microsoft 365 {} for {}", state, tenant.name)?;
    Ok(())
}

pub async fn set_guarantee(
    api: &dyn PostureApi,
    tenant_id: &str,
    key: &str,
    enabled: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let update = GuaranteeUpdate {
        guarantees: vec![GuaranteeToggle { key: key.to_string(), enabled }],
    };
    let tenant = api
        .update_guarantees(tenant_id, &update)
        .await
        .context("updating guarantees")?;
    record(
        api,
        NewAuditEntry::new(AuditAction::GuaranteesUpdated)
            .tenant(tenant_id)
            .target(key)
            .detail(if enabled { "enabled" } else { "disabled" }),
        out,
    )
    .await?;

    print_guarantees(&tenant, out)
}

fn print_guarantees(tenant: &Tenant, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "Guarantees for {}:", tenant.name)?;
    for g in &tenant.guarantees {
        writeln!(out, "  [{}] {} ({})", if g.enabled { "x" } else { " " }, g.label, g.key)?;
    }
    Ok(())
}

/// The change already happened; a failed audit write is reported, not fatal.
async fn record(
    api: &dyn PostureApi,
    entry: NewAuditEntry,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if let Err(e) = api.write_audit(&entry).await {
        warn!(action = entry.action.as_str(), error = %e, "audit entry not recorded");
        writeln!(out, "warning: audit entry not recorded: {}", e.user_message())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use posture_core::{
        CategoryScore, Guarantee, IdentityReport, MockPostureApi, SecureScoreEntry, ServiceError,
    };

    fn tenant(connected: bool) -> Tenant {
        Tenant {
            id: "t1".into(),
            name: "Contoso".into(),
            domain: "contoso.com".into(),
            microsoft365: connected.then(|| posture_core::Microsoft365Connection {
                client_id: "app-1".into(),
                connected: true,
            }),
            guarantees: vec![Guarantee {
                key: "backup".into(),
                label: "Daily backup".into(),
                enabled: true,
            }],
        }
    }

    fn entry(month: &str, day: u32, percentage: f64) -> SecureScoreEntry {
        SecureScoreEntry {
            month: month.into(),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            percentage,
            comparative: None,
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_list_tenants_prints_connection() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| Ok(vec![tenant(true)]));

        let mut out = Vec::new();
        list_tenants(&api, &mut out).await.unwrap();

        let text = output(out);
        assert!(text.contains("contoso.com"));
        assert!(text.contains("connected"));
    }

    #[tokio::test]
    async fn test_list_tenants_propagates_status() {
        let mut api = MockPostureApi::new();
        api.expect_list_tenants().returning(|| {
            Err(ServiceError::Status { status: 502, message: "bad gateway".into() })
        });

        let err = list_tenants(&api, &mut Vec::new()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("502"));
    }

    #[tokio::test]
    async fn test_scores_with_user_include_categories() {
        let mut api = MockPostureApi::new();
        api.expect_user_secure_scores()
            .returning(|_, _| Ok(vec![entry("Apr", 1, 50.0), entry("May", 2, 72.5)]));
        api.expect_score_history().returning(|_| Ok(vec![entry("May", 2, 72.5)]));
        api.expect_identity_report().returning(|_, _| {
            Ok(IdentityReport {
                score: CategoryScore { percentage: 25.0, comparative: None },
                mfa: Default::default(),
                people: Vec::new(),
                commentary: None,
            })
        });
        api.expect_data_report()
            .returning(|_, _| Err(ServiceError::Status { status: 404, message: String::new() }));
        api.expect_apps_report().returning(|_, _| Err(ServiceError::Timeout));

        let mut out = Vec::new();
        show_scores(&api, "t1", Some("u1"), &mut out).await.unwrap();

        let text = output(out);
        assert!(text.contains("Secure score: 72.5% (Good) +22.5"));
        assert!(text.contains("risk 75.0% (High)"));
        assert!(text.contains("data      unavailable: Failed to load (HTTP 404)"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_domain_without_request() {
        let mut api = MockPostureApi::new();
        api.expect_create_tenant().times(0);

        let result = create_tenant(&api, "Contoso", "not a domain", None, &mut Vec::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_and_connect_audits_both() {
        let mut api = MockPostureApi::new();
        api.expect_create_tenant().returning(|_| Ok(tenant(false)));
        api.expect_connect_microsoft365().returning(|_, _| Ok(tenant(true)));
        api.expect_write_audit()
            .withf(|e| e.action == AuditAction::TenantCreated)
            .times(1)
            .returning(|_| Ok(()));
        api.expect_write_audit()
            .withf(|e| e.action == AuditAction::Microsoft365Connected)
            .times(1)
            .returning(|_| Err(ServiceError::Timeout));

        let creds = M365Credentials { client_id: "app-1".into(), client_secret: "s".into() };
        let mut out = Vec::new();
        create_tenant(&api, "Contoso", "contoso.com", Some(creds), &mut out)
            .await
            .unwrap();

        let text = output(out);
        assert!(text.contains("Created tenant Contoso (t1)"));
        assert!(text.contains("warning: audit entry not recorded"));
        assert!(text.contains("Microsoft 365 connected for Contoso"));
    }

    #[tokio::test]
    async fn test_guarantee_sends_single_toggle() {
        let mut api = MockPostureApi::new();
        api.expect_update_guarantees()
            .withf(|id, update| {
                id == "t1"
                    && update.guarantees
                        == vec![GuaranteeToggle { key: "backup".into(), enabled: false }]
            })
            .returning(|_, _| Ok(tenant(true)));
        api.expect_write_audit().returning(|_| Ok(()));

        let mut out = Vec::new();
        set_guarantee(&api, "t1", "backup", false, &mut out).await.unwrap();
        assert!(output(out).contains("Daily backup (backup)"));
    }
}
