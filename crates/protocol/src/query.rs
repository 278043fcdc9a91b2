use chrono::{DateTime, Utc};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Campo usado na ordenação do resultado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Time,
    Content,
}

impl SortField {
    pub fn parse(s: &str) -> Option<SortField> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" | "timestamp" => Some(SortField::Time),
            "content" | "message" => Some(SortField::Content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<SortOrder> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Opções de consulta ao store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub page: usize,
    pub page_size: usize,
    /// Limite inferior inclusivo.
    pub start_time: Option<DateTime<Utc>>,
    /// Limite superior inclusivo.
    pub end_time: Option<DateTime<Utc>>,
    /// Filtro por substring (case-sensitive).
    pub text: Option<String>,
    /// Mantém só os `top_n` matches mais recentes, antes de ordenar. 0 desliga.
    pub top_n: usize,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl QueryOptions {
    /// Aplica os defaults a valores fora do intervalo aceito.
    pub fn normalized(mut self) -> Self {
        if self.page < 1 {
            self.page = DEFAULT_PAGE;
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.text.as_deref().is_some_and(str::is_empty) {
            self.text = None;
        }
        self
    }

    /// Índice do primeiro item da página.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            start_time: None,
            end_time: None,
            text: None,
            top_n: 0,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}
