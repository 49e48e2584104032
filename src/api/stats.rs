use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{join_all, ApiClient, Task};
use crate::error::ApiError;
use crate::models::blog::Blog;
use crate::models::contact::ContactMessage;
use crate::models::project::Project;
use crate::models::service::Service;
use crate::models::testimonial::Testimonial;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: String,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceShare {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: &'static str,
    pub visitors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_blogs: usize,
    pub total_testimonials: usize,
    pub total_services: usize,
    pub total_messages: usize,
    pub projects_by_year: Vec<YearCount>,
    pub services_distribution: Vec<ServiceShare>,
    pub monthly_visitors: Vec<MonthCount>,
}

/// Best-effort parse of the date strings the CMS stores.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    for fmt in ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return Some(d);
    }
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    None
}

/// Pure aggregation over already-fetched collections.
pub fn aggregate(
    projects: &[Project],
    blogs: &[Blog],
    testimonials: usize,
    services: &[Service],
    messages: usize,
    today: NaiveDate,
) -> DashboardStats {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for project in projects {
        let year = project
            .date
            .as_deref()
            .and_then(parse_date)
            .map(|d| d.year())
            .unwrap_or_else(|| today.year());
        *by_year.entry(year).or_insert(0) += 1;
    }

    let mut monthly = [0usize; 12];
    for blog in blogs {
        if let Some(d) = parse_date(&blog.date) {
            if d.year() == today.year() {
                monthly[d.month0() as usize] += 1;
            }
        }
    }

    DashboardStats {
        total_projects: projects.len(),
        total_blogs: blogs.len(),
        total_testimonials: testimonials,
        total_services: services.len(),
        total_messages: messages,
        projects_by_year: by_year
            .into_iter()
            .map(|(year, completed)| YearCount {
                year: year.to_string(),
                completed,
            })
            .collect(),
        services_distribution: services
            .iter()
            .map(|s| ServiceShare {
                name: s.title.clone(),
                value: 1,
            })
            .collect(),
        monthly_visitors: MONTHS
            .iter()
            .zip(monthly)
            .map(|(&month, visitors)| MonthCount { month, visitors })
            .collect(),
    }
}

enum Part {
    Projects(Vec<Project>),
    Blogs(Vec<Blog>),
    Testimonials(Vec<Testimonial>),
    Services(Vec<Service>),
    Messages(Vec<ContactMessage>),
}

pub struct StatsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn stats(&self) -> StatsApi<'_> {
        StatsApi { client: self }
    }
}

impl<'a> StatsApi<'a> {
    /// Five concurrent fetches, then `aggregate`. Any failed fetch fails the
    /// whole dashboard.
    pub fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        self.dashboard_on(Local::now().date_naive())
    }

    pub fn dashboard_on(&self, today: NaiveDate) -> Result<DashboardStats, ApiError> {
        let (c1, c2, c3, c4, c5) = (
            self.client.clone(),
            self.client.clone(),
            self.client.clone(),
            self.client.clone(),
            self.client.clone(),
        );
        let tasks: Vec<Task<Part>> = vec![
            Box::new(move || c1.projects().list().map(Part::Projects)),
            Box::new(move || c2.blogs().list().map(Part::Blogs)),
            Box::new(move || c3.testimonials().list().map(Part::Testimonials)),
            Box::new(move || c4.services().list().map(Part::Services)),
            Box::new(move || c5.contact().messages().map(Part::Messages)),
        ];

        let parts = join_all(tasks).map_err(|e| {
            log::error!("[stats] dashboard fetch failed: {}", e);
            e
        })?;

        let (mut projects, mut blogs, mut services) = (Vec::new(), Vec::new(), Vec::new());
        let (mut testimonials, mut messages) = (0, 0);
        for part in parts {
            match part {
                Part::Projects(p) => projects = p,
                Part::Blogs(b) => blogs = b,
                Part::Testimonials(t) => testimonials = t.len(),
                Part::Services(s) => services = s,
                Part::Messages(m) => messages = m.len(),
            }
        }
        log::debug!(
            "[stats] {} projects, {} blogs, {} services",
            projects.len(),
            blogs.len(),
            services.len()
        );
        Ok(aggregate(&projects, &blogs, testimonials, &services, messages, today))
    }
}
