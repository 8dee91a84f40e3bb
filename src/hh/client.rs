use super::models::{SearchPage, VacancyDetail};
use crate::config::ScraperConfig;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use tracing::{info, warn};

/// Search queries the analysis covers.
pub const DEFAULT_QUERIES: [&str; 7] = [
    "python разработчик",
    "backend разработчик",
    "frontend разработчик",
    "fullstack разработчик",
    "системный аналитик",
    "data analyst",
    "devops инженер",
];

#[derive(Debug, thiserror::Error)]
pub enum HhError {
    #[error("request to hh.ru failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("hh.ru returned {status} for {url}")]
    Status { status: StatusCode, url: String },
}

pub struct HhClient {
    client: reqwest::Client,
    config: ScraperConfig,
}

impl HhClient {
    pub fn new(config: ScraperConfig) -> Result<Self, HhError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("HH-User-Agent"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    /// One page of search results for a query.
    pub async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage, HhError> {
        let url = format!("{}/vacancies", self.config.base_url);
        let page = page.to_string();
        let per_page = self.config.per_page.to_string();
        let area = self.config.area.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("text", query),
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
                ("area", area.as_str()),
                ("only_with_salary", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HhError::Status { status, url });
        }

        Ok(response.json().await?)
    }

    /// Full description for one vacancy.
    pub async fn vacancy(&self, id: &str) -> Result<VacancyDetail, HhError> {
        let url = format!("{}/vacancies/{}", self.config.base_url, id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HhError::Status { status, url });
        }

        Ok(response.json().await?)
    }

    /// Walk the paginated search for every query and fetch each hit's full
    /// record. Detail failures skip the vacancy; a failed search page ends
    /// pagination for that query. Requests stay strictly sequential with a
    /// fixed pause between them.
    pub async fn collect_vacancies(&self, queries: &[&str]) -> Vec<VacancyDetail> {
        let mut collected: Vec<VacancyDetail> = Vec::new();

        for query in queries {
            info!(query, "searching vacancies");

            for page in 0..self.config.max_pages {
                let search = match self.search_page(query, page).await {
                    Ok(search) => search,
                    Err(err) => {
                        warn!(query, page, %err, "search page failed, moving to next query");
                        break;
                    }
                };

                if search.items.is_empty() {
                    break;
                }

                let mut fetched = 0usize;
                for hit in &search.items {
                    // Already collected under a previous query.
                    if collected.iter().any(|v| v.id == hit.id) {
                        continue;
                    }

                    match self.vacancy(&hit.id).await {
                        Ok(detail) => {
                            collected.push(detail);
                            fetched += 1;
                        }
                        Err(err) => {
                            warn!(vacancy_id = %hit.id, %err, "skipping vacancy");
                        }
                    }

                    tokio::time::sleep(self.config.detail_delay).await;
                }

                info!(query, page = page + 1, fetched, "search page done");
                tokio::time::sleep(self.config.page_delay).await;

                if page + 1 >= search.pages {
                    break;
                }
            }
        }

        collected
    }
}
