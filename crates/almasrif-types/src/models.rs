use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Number of issues in the contest.
pub const ISSUE_COUNT: usize = 8;

/// Labels that precede an issue number inside an excellence mention,
/// e.g. `العدد 5`.
const ISSUE_LABELS: &[&str] = &["العدد ", "issue "];

/// A contest issue, always within `1..=ISSUE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct IssueNumber(u8);

impl IssueNumber {
    pub fn new(n: u8) -> Option<Self> {
        (1..=ISSUE_COUNT as u8).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All issues in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=ISSUE_COUNT as u8).map(Self)
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Score that earns the "excellent" designation on this issue.
    pub fn perfect_score(self) -> i64 {
        match self.0 {
            1 => 400_000,
            3 => 600_000,
            _ => 800_000,
        }
    }

    pub fn is_excellent(self, score: i64) -> bool {
        score == self.perfect_score()
    }
}

impl TryFrom<u8> for IssueNumber {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n).ok_or_else(|| format!("issue number out of range: {}", n))
    }
}

impl From<IssueNumber> for u8 {
    fn from(issue: IssueNumber) -> u8 {
        issue.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub nickname: String,
    pub phone: String,
}

/// One entry of a user's excellence list, as graded out of band.
///
/// The label is kept verbatim for display; `issue` is only set when the
/// label names an issue in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcellentMention {
    pub label: String,
    pub issue: Option<IssueNumber>,
}

impl ExcellentMention {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        let issue = ISSUE_LABELS.iter().find_map(|prefix| {
            label.match_indices(prefix).find_map(|(idx, _)| {
                let digits: String = label[idx + prefix.len()..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse::<u8>().ok().and_then(IssueNumber::new)
            })
        });

        Self {
            label: label.to_string(),
            issue,
        }
    }

    /// Canonical mention for an issue, in the contest's own wording.
    pub fn for_issue(issue: IssueNumber) -> Self {
        Self {
            label: format!("{}{}", ISSUE_LABELS[0], issue.get()),
            issue: Some(issue),
        }
    }
}

/// A user's graded scores. One record per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub user_id: UserId,
    pub issues: [i64; ISSUE_COUNT],
    pub total_score: i64,
    pub participation_count: i64,
    pub excellent_issues: Vec<ExcellentMention>,
}

impl ScoreRecord {
    /// Builds a record with `total_score` derived from the issue scores.
    pub fn new(
        user_id: UserId,
        issues: [i64; ISSUE_COUNT],
        participation_count: i64,
        excellent_issues: Vec<ExcellentMention>,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            issues,
            total_score: issues.iter().sum(),
            participation_count,
            excellent_issues,
        }
    }

    /// All-zero record shown when a user has not been graded yet.
    pub fn empty(user_id: UserId) -> Self {
        Self::new(user_id, [0; ISSUE_COUNT], 0, Vec::new())
    }

    pub fn issue_score(&self, issue: IssueNumber) -> i64 {
        self.issues[issue.index()]
    }

    pub fn excellent_count(&self) -> usize {
        self.excellent_issues.len()
    }
}
