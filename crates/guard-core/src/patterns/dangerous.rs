//! Dangerous pattern table: commands permitted only after human approval.
//!
//! Evaluated after the forbidden table returns no match. Order decides which
//! reason is reported when a command trips more than one rule.

use super::PatternRule;

pub fn default_dangerous_rules() -> Vec<PatternRule> {
    vec![
        // Destructive filesystem operations.
        PatternRule::new(
            "force-recursive-delete",
            r"\brm\s+(?:-[a-zA-Z]*[rf][a-zA-Z]*(?:\s+-[a-zA-Z]+)*|--recursive|--force)\b",
            "Force recursive delete",
        ),
        PatternRule::new(
            "shred-wipe",
            r"\bshred\b",
            "Secure file wipe",
        ),
        // Privilege escalation.
        PatternRule::new(
            "privilege-escalation",
            r"\b(?:sudo|doas)\b|\bsu\s+-",
            "Root privileges",
        ),
        // Dangerous permission changes.
        PatternRule::new(
            "permissive-chmod",
            r"\bchmod\s+(?:-[a-zA-Z]*R[a-zA-Z]*\s+)?(?:0?777|a\+rwx|-R\s+777)\b",
            "Overly permissive mode change",
        ),
        PatternRule::new(
            "chown-root",
            r"\bchown\s+(?:-R\s+)?root\b",
            "Ownership change to root",
        ),
        // System modification.
        PatternRule::new(
            "systemd-unit-change",
            r"\bsystemctl\s+(?:disable|mask|stop)\s+\S+",
            "System service modification",
        ),
        // Network / firewall disabling.
        PatternRule::new(
            "firewall-disable",
            r"\biptables\s+-F\b|\bufw\s+disable\b|\bsystemctl\s+(?:stop|disable)\s+(?:firewalld|ufw)\b",
            "Firewall disabled",
        ),
        // Unattended package removal.
        PatternRule::new(
            "unattended-package-removal",
            r"\b(?:apt(?:-get)?|yum|dnf)\s+(?:remove|purge|autoremove)\s+(?:-y|--assume-yes)\b",
            "Unattended package removal",
        ),
        // Data destruction.
        PatternRule::new(
            "raw-disk-write",
            r"\bdd\s+[^\n]*\bof=/dev/(?:sd|nvme|hd|vd)\w*",
            "Raw disk write",
        ),
        PatternRule::new(
            "filesystem-format",
            r"\bmkfs(?:\.\w+)?\b",
            "Filesystem format",
        ),
        // Process / system control.
        PatternRule::new(
            "system-shutdown",
            r"\b(?:shutdown|reboot|halt|poweroff)\b",
            "System shutdown/reboot",
        ),
        PatternRule::new(
            "kill-broad",
            r"\bkill\s+-9\s+1\b|\bpkill\s+-9\b|\bkillall\s+-9\b",
            "Broad process kill",
        ),
        // Pipe-to-shell downloads (remote code execution).
        PatternRule::new(
            "pipe-to-shell",
            r"(?:curl|wget)\s+[^\n|]*\|\s*(?:sudo\s+)?(?:bash|sh|zsh)\b",
            "Piping remote script to shell",
        ),
        // History-rewriting VCS operations.
        PatternRule::new(
            "git-force-push",
            r"\bgit\s+push\s+[^\n]*--force\b|\bgit\s+push\s+[^\n]*-f\b",
            "Force push rewrites remote history",
        ),
        PatternRule::new(
            "git-history-rewrite",
            r"\bgit\s+(?:reset\s+--hard|filter-branch|rebase\s+-i)\b",
            "Git history rewrite",
        ),
        // Destructive SQL.
        PatternRule::new(
            "destructive-sql",
            r"(?i)\b(?:drop\s+(?:table|database|schema)|truncate\s+table)\b",
            "Destructive SQL statement",
        ),
        // Critical environment mutation.
        PatternRule::new(
            "critical-env-mutation",
            r"\bunset\s+PATH\b|\bexport\s+PATH=",
            "Critical environment variable mutation",
        ),
        // Fork bombs and resource-exhaustion loops.
        PatternRule::new(
            "fork-bomb",
            r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            "Fork bomb",
        ),
        PatternRule::new(
            "infinite-loop",
            r"\bwhile\s*\(?\s*(?:true|1)\s*\)?\s*;?\s*do\b",
            "Potential infinite loop",
        ),
    ]
}
