//! Song listing query construction
//!
//! Filters are accumulated as (predicate, value) pairs and rendered once into
//! parameterized SQL. User-supplied values only ever travel as bind arguments.

/// Page used when none (or garbage) is supplied
pub const DEFAULT_PAGE: i64 = 1;

/// Rows per page used when none (or garbage) is supplied
pub const DEFAULT_LIMIT: i64 = 10;

const SELECT_SONGS: &str =
    "SELECT song_id, group_name, song_name, release_date, lyrics, link FROM songs";

/// A LIMIT/OFFSET window over the ordered song list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-indexed page number, always >= 1
    pub page: i64,
    /// Page size, always >= 1
    pub limit: i64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageWindow {
    /// Build a window, replacing values below 1 with the defaults
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build a window from raw query-string values
    ///
    /// Missing, unparsable and non-positive values fall back to the defaults.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i64>().ok());
        Self::new(
            parse(page).unwrap_or(DEFAULT_PAGE),
            parse(limit).unwrap_or(DEFAULT_LIMIT),
        )
    }

    /// Rows to skip: `(page - 1) * limit`, saturating on absurd pages
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Optional listing filters; empty strings count as "not supplied"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    /// Case-insensitive substring of the group name
    pub group: Option<String>,
    /// Case-insensitive substring of the song name
    pub song: Option<String>,
    /// Exact release date
    pub release_date: Option<String>,
}

impl SongFilter {
    pub fn new(group: Option<String>, song: Option<String>, release_date: Option<String>) -> Self {
        Self {
            group: non_empty(group),
            song: non_empty(song),
            release_date: non_empty(release_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_none() && self.song.is_none() && self.release_date.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predicate {
    GroupContains,
    SongContains,
    ReleaseDateEquals,
}

impl Predicate {
    /// SQL fragment comparing the column against `placeholder`
    fn render(self, placeholder: &str) -> String {
        match self {
            Predicate::GroupContains => format!("group_name ILIKE {}", placeholder),
            Predicate::SongContains => format!("song_name ILIKE {}", placeholder),
            Predicate::ReleaseDateEquals => format!("release_date = {}", placeholder),
        }
    }
}

/// SQL text plus the arguments to bind, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    pub sql: String,
    /// Text arguments for `$1..$n`
    pub args: Vec<String>,
    /// Bound as `$n+1`
    pub limit: i64,
    /// Bound as `$n+2`
    pub offset: i64,
}

/// Builder for the song listing statement
#[derive(Debug, Clone, Default)]
pub struct SongQuery {
    clauses: Vec<(Predicate, String)>,
    window: PageWindow,
}

impl SongQuery {
    pub fn new(window: PageWindow) -> Self {
        Self {
            clauses: Vec::new(),
            window,
        }
    }

    /// Add every supplied filter; clauses are joined with AND
    pub fn with_filter(mut self, filter: &SongFilter) -> Self {
        if let Some(group) = &filter.group {
            self.push(Predicate::GroupContains, contains_pattern(group));
        }
        if let Some(song) = &filter.song {
            self.push(Predicate::SongContains, contains_pattern(song));
        }
        if let Some(date) = &filter.release_date {
            self.push(Predicate::ReleaseDateEquals, date.clone());
        }
        self
    }

    fn push(&mut self, predicate: Predicate, value: String) {
        self.clauses.push((predicate, value));
    }

    pub fn render(&self) -> RenderedQuery {
        let mut sql = String::from(SELECT_SONGS);
        let mut args = Vec::with_capacity(self.clauses.len());

        if !self.clauses.is_empty() {
            let predicates: Vec<String> = self
                .clauses
                .iter()
                .enumerate()
                .map(|(i, (predicate, value))| {
                    args.push(value.clone());
                    predicate.render(&format!("${}", i + 1))
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        let next = args.len() + 1;
        sql.push_str(&format!(
            " ORDER BY song_id ASC LIMIT ${} OFFSET ${}",
            next,
            next + 1
        ));

        RenderedQuery {
            sql,
            args,
            limit: self.window.limit,
            offset: self.window.offset(),
        }
    }
}

/// `%value%` with LIKE metacharacters escaped so they match literally
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
