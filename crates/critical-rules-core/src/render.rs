//! Markdown responses returned to the assistant host.
//!
//! Every tool answers with prose; failures are rendered here too, so callers
//! never see a bare error code.

use crate::resources::{CHANGELOG_URI, INSTRUCTIONS_URI};
use crate::updater::{RemoteStatus, UpdateCheck, UpdateError, UpdateOutcome, VersionInfo};
use critical_rules_store::VersionRecord;

/// Checklist the assistant confirms before starting a technical task.
pub fn compliance_checklist(task_description: &str, record: &VersionRecord) -> String {
    format!(
        r#"## ✅ MANDATORY COMPLIANCE CHECKLIST

Before starting: "{task}"

Please confirm:

- [ ] ✅ Read complete instructions from {uri}
- [ ] ✅ Will search current best practices if applicable
- [ ] ✅ Will read appropriate skills before creating documents
- [ ] ✅ Will read ENTIRE file before modifying
- [ ] ✅ Will VERIFY, NOT assume structures/locations
- [ ] ✅ Will make BACKUPS with timestamp in correct directory
- [ ] ✅ Will ASK before deleting/modifying critical items
- [ ] ✅ Will ask SCOPE before implementing
- [ ] ✅ Will STOP if something fails
- [ ] ✅ Will validate with EVIDENCE, not assumptions
- [ ] ✅ Will search previous context if mentioned

**Only proceed after confirming all items.**

**Based on analysis of {count} documented failures.**
**Rules version: {version} ({date})**
"#,
        task = task_description,
        uri = INSTRUCTIONS_URI,
        count = record.rule_count,
        version = record.version,
        date = record.short_date(),
    )
}

/// Condensed overview of the rules.
pub fn rules_summary(record: &VersionRecord) -> String {
    format!(
        r#"## 📋 CRITICAL RULES SUMMARY

**Version: {version} | Updated: {date}**
**Based on {count} documented failures | 20 recurring patterns**

### Core Principles:
1. **🔍 VERIFY, DON'T ASSUME** - Always check before acting
2. **💾 BACKUP EVERYTHING** - Before any modification
3. **🚫 ASK PERMISSION** - For deletions and critical changes
4. **📊 EVIDENCE-BASED** - Test with proof, not assumptions
5. **🛑 STOP ON ERRORS** - Don't continue after failures

### Key Areas Covered:
- ✅ Current best practices search (mandatory)
- ✅ Complete file reading (not just first lines)
- ✅ Backup procedures (standardized directories)
- ✅ Permission requirements (what needs approval)
- ✅ Code validation (credentials, rate limits)
- ✅ Diagnostics (complete logs, evidence)
- ✅ Database safety (backup, test, rollback)
- ✅ Security (firewall, fail2ban, IPs)
- ✅ Precise communication (no ambiguity)
- ✅ Production vs Dev (critical differentiation)

### 6-Step Mandatory Workflow:
0. Ask scope before starting
1. Analyze completely
2. Plan and explain
3. Create backups
4. Execute carefully
5. Validate with evidence
6. Document changes

**Full details: {uri}**
**Updates: Use check_for_updates tool**
"#,
        version = record.version,
        date = record.short_date(),
        count = record.rule_count,
        uri = INSTRUCTIONS_URI,
    )
}

/// Installed version, plus remote status when one was requested.
pub fn version_info(info: &VersionInfo) -> String {
    let local = &info.local;
    let mut out = format!(
        r#"## 📦 VERSION INFORMATION

### Current Version
- **Version:** {version}
- **Date:** {date}
- **SHA256:** {checksum}...
- **Rules Count:** {count} documented failures
"#,
        version = local.version,
        date = local.short_date(),
        checksum = local.checksum_prefix(16),
        count = local.rule_count,
    );

    match &info.remote {
        RemoteStatus::NotChecked => {}
        RemoteStatus::Checked(remote) => {
            let current = local.same_version(remote);
            out.push_str(&format!(
                r#"
### Remote Version (GitHub)
- **Latest:** {version}
- **Date:** {date}
- **Status:** {status}
"#,
                version = remote.version,
                date = remote.short_date(),
                status = if current { "✅ Up to date" } else { "🔄 Update available" },
            ));
            if !current {
                out.push_str(
                    "\n**New version available!**\nUse `update_rules` tool to download the latest version.\n",
                );
            }
        }
        RemoteStatus::Unavailable(message) => {
            out.push_str(&format!("\n### Remote Check\n❌ {message}\n"));
        }
    }

    out.push_str(&format!(
        r#"
### Auto-Update
- Check for updates: `check_for_updates`
- Install updates: `update_rules`
- View changelog: Read resource `{CHANGELOG_URI}`
"#
    ));
    out
}

/// Outcome of an update check.
pub fn update_check(result: &Result<UpdateCheck, UpdateError>) -> String {
    match result {
        Ok(UpdateCheck::UpdateAvailable { local, remote }) => format!(
            r#"## 🔄 UPDATE AVAILABLE

**Current Version:** {current}
**Latest Version:** {latest}
**Release Date:** {date}

### What's New
- Rules count updated: {count} patterns
- Last updated: {date}

### To Update
Run: `update_rules` tool

### Changelog
Read resource: `{changelog}`
"#,
            current = local.version,
            latest = remote.version,
            date = remote.short_date(),
            count = remote.rule_count,
            changelog = CHANGELOG_URI,
        ),
        Ok(UpdateCheck::UpToDate { local }) => format!(
            r#"## ✅ UP TO DATE

**Current Version:** {version}
**Date:** {date}

You're running the latest version of critical rules.

**Next Check:** Run `check_for_updates` anytime
"#,
            version = local.version,
            date = local.short_date(),
        ),
        Err(e) => format!("❌ Failed to check for updates: {e}"),
    }
}

/// Outcome of an update attempt.
pub fn update_result(result: &Result<UpdateOutcome, UpdateError>) -> String {
    match result {
        Ok(UpdateOutcome::AlreadyCurrent { version }) => format!(
            "✅ Already on latest version ({version})\n\nUse `force: true` to reinstall anyway."
        ),
        Ok(UpdateOutcome::Installed(report)) => format!(
            r#"## ✅ UPDATE SUCCESSFUL

**Previous Version:** {previous}
**New Version:** {current}
**Updated:** {date}

### Changes
- Rules count: {count} patterns
- SHA256 verified: ✅
- Backup created: {backup}
- Changelog: {changelog}

### What's Next
- Read changelog: `{changelog_uri}`
- View new rules: `{instructions_uri}`
- Get summary: `get_rules_summary`
"#,
            previous = report.previous.version,
            current = report.current.version,
            date = report.updated_date(),
            count = report.current.rule_count,
            backup = report.backup_path.display(),
            changelog = if report.changelog_path.is_some() {
                "refreshed"
            } else {
                "unavailable (kept previous copy)"
            },
            changelog_uri = CHANGELOG_URI,
            instructions_uri = INSTRUCTIONS_URI,
        ),
        Err(e @ UpdateError::Write { backup, .. }) => format!(
            "❌ Update failed: {e}\n\nThe rules document on disk may be incomplete; restore it from {}. The rules in use until restart are unchanged.",
            backup.display()
        ),
        Err(e) if e.left_state_unchanged() => {
            format!("❌ Update failed: {e}\n\nYour current rules remain unchanged.")
        }
        Err(e) => format!(
            "❌ Update failed: {e}\n\nThe new rules document is active but its version record is stale; run `update_rules` with `force: true` to repair."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteArtifact, RemoteError};
    use crate::updater::UpdateReport;
    use std::path::PathBuf;

    fn record(version: &str) -> VersionRecord {
        VersionRecord {
            version: version.to_string(),
            date: "2025-02-10T09:00:00.000Z".to_string(),
            checksum: "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90".to_string(),
            rule_count: 96,
        }
    }

    fn unavailable() -> UpdateError {
        UpdateError::RemoteUnavailable(RemoteError::Unavailable {
            artifact: RemoteArtifact::VersionDescriptor,
            message: "Failed to fetch: Service Unavailable".to_string(),
        })
    }

    #[test]
    fn test_checklist_quotes_task() {
        let text = compliance_checklist("migrate the database", &record("1.0.0"));
        assert!(text.contains("Before starting: \"migrate the database\""));
        assert!(text.contains("**Rules version: 1.0.0 (2025-02-10)**"));
        assert_eq!(text.matches("- [ ] ✅").count(), 11);
    }

    #[test]
    fn test_summary_header() {
        let text = rules_summary(&record("1.2.0"));
        assert!(text.contains("**Version: 1.2.0 | Updated: 2025-02-10**"));
        assert!(text.contains(INSTRUCTIONS_URI));
    }

    #[test]
    fn test_version_info_local_only() {
        let text = version_info(&VersionInfo {
            local: record("1.0.0"),
            remote: RemoteStatus::NotChecked,
        });
        assert!(text.contains("- **SHA256:** a1b2c3d4e5f60718..."));
        assert!(text.contains("- **Rules Count:** 96 documented failures"));
        assert!(!text.contains("Remote"));
    }

    #[test]
    fn test_version_info_remote_newer() {
        let text = version_info(&VersionInfo {
            local: record("1.0.0"),
            remote: RemoteStatus::Checked(record("1.1.0")),
        });
        assert!(text.contains("- **Latest:** 1.1.0"));
        assert!(text.contains("🔄 Update available"));
        assert!(text.contains("**New version available!**"));
    }

    #[test]
    fn test_version_info_remote_same() {
        let text = version_info(&VersionInfo {
            local: record("1.0.0"),
            remote: RemoteStatus::Checked(record("1.0.0")),
        });
        assert!(text.contains("✅ Up to date"));
        assert!(!text.contains("New version available"));
    }

    #[test]
    fn test_version_info_remote_error() {
        let text = version_info(&VersionInfo {
            local: record("1.0.0"),
            remote: RemoteStatus::Unavailable("Unable to check remote version".to_string()),
        });
        assert!(text.contains("### Remote Check\n❌ Unable to check remote version"));
        assert!(text.contains("- **Version:** 1.0.0"));
    }

    #[test]
    fn test_update_check_texts() {
        let available = update_check(&Ok(UpdateCheck::UpdateAvailable {
            local: record("1.0.0"),
            remote: record("1.1.0"),
        }));
        assert!(available.starts_with("## 🔄 UPDATE AVAILABLE"));
        assert!(available.contains("**Latest Version:** 1.1.0"));

        let current = update_check(&Ok(UpdateCheck::UpToDate { local: record("1.0.0") }));
        assert!(current.starts_with("## ✅ UP TO DATE"));

        let failed = update_check(&Err(unavailable()));
        assert_eq!(
            failed,
            "❌ Failed to check for updates: Failed to fetch: Service Unavailable"
        );
    }

    #[test]
    fn test_update_result_texts() {
        let already = update_result(&Ok(UpdateOutcome::AlreadyCurrent {
            version: "1.1.0".to_string(),
        }));
        assert!(already.starts_with("✅ Already on latest version (1.1.0)"));

        let installed = update_result(&Ok(UpdateOutcome::Installed(UpdateReport {
            previous: record("1.0.0"),
            current: record("1.1.0"),
            backup_path: PathBuf::from("/data/CRITICAL-RULES.backup.1.0.0.md"),
            changelog_path: None,
            updated_at: "2025-03-03T03:03:03.000Z".to_string(),
        })));
        assert!(installed.contains("**Previous Version:** 1.0.0"));
        assert!(installed.contains("**New Version:** 1.1.0"));
        assert!(installed.contains("Backup created: /data/CRITICAL-RULES.backup.1.0.0.md"));

        let failed = update_result(&Err(unavailable()));
        assert!(failed.ends_with("Your current rules remain unchanged."));
    }

    #[test]
    fn test_write_failure_names_backup() {
        let failed = update_result(&Err(UpdateError::Write {
            backup: PathBuf::from("/data/CRITICAL-RULES.backup.1.0.0.md"),
            source: critical_rules_store::StoreError::MissingContent(PathBuf::from(
                "/data/CRITICAL-RULES.md",
            )),
        }));
        assert!(failed.starts_with("❌ Update failed: Could not write rules:"));
        assert!(failed.contains("restore it from /data/CRITICAL-RULES.backup.1.0.0.md"));
        assert!(!failed.contains("remain unchanged"));
    }
}
