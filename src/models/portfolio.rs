//! # 포트폴리오(메인 페이지) 콘텐츠 모델
//!
//! 메인 페이지에 표시할 소개, 기술 스택, 프로젝트, 경력, 학력을 담습니다.
//! 기본 콘텐츠는 `content/portfolio.json`이 바이너리에 포함되며,
//! `PORTFOLIO_PATH`로 다른 파일을 지정할 수 있습니다.

use serde::{Deserialize, Serialize};

const DEFAULT_PORTFOLIO: &str = include_str!("../../content/portfolio.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub email: String,
    pub location: String,
    #[serde(default)]
    pub links: Vec<Link>,
    pub about: About,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    pub education: Education,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct About {
    pub bio: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    pub impact: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
}

impl Portfolio {
    /// 포트폴리오 콘텐츠를 읽어옵니다.
    ///
    /// 경로가 주어지면 해당 파일을, 없으면 내장 기본 콘텐츠를 파싱합니다.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let raw = match path {
            Some(path) => std::fs::read_to_string(path)?,
            None => DEFAULT_PORTFOLIO.to_string(),
        };
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_portfolio_parses() {
        let portfolio = Portfolio::load(None).unwrap();
        assert!(!portfolio.name.is_empty());
        assert!(!portfolio.projects.is_empty());
    }
}
