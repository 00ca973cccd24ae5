//! # 마크다운 렌더링 서비스
//!
//! 블로그 본문(마크다운)을 HTML로 바꾸고, 읽기 시간 계산에 쓰는 텍스트 통계를 제공합니다.
//!
//! 이 모듈의 함수들:
//! - `render_markdown()`: 마크다운 → HTML 변환 (표, 취소선 지원)
//! - `count_words()`: 텍스트의 단어 수 계산
//! - `reading_time_minutes()`: 분당 200단어 기준 읽기 시간 (최소 1분)

use pulldown_cmark::{html, Options, Parser};

/// 읽기 시간 계산 기준 (분당 단어 수)
pub const WORDS_PER_MINUTE: usize = 200;

/// 마크다운 문자열을 HTML로 렌더링합니다.
///
/// 본문은 관리자만 작성하므로 원문 HTML 블록도 그대로 통과시킵니다.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    // Parser는 이벤트(Event) 스트림을 내보내는 반복자(Iterator)입니다.
    // push_html()이 이 스트림을 소비하며 HTML 문자열을 채웁니다.
    let parser = Parser::new_ext(source, options);
    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// 텍스트의 단어 수를 계산합니다.
///
/// 공백(스페이스, 탭, 줄바꿈)으로 분리하여 단어를 셉니다.
pub fn count_words(text: &str) -> usize {
    // split_whitespace(): 연속된 공백을 하나로 취급하며 분리
    text.split_whitespace().count()
}

/// 예상 읽기 시간(분). 올림하며 최소 1분입니다.
pub fn reading_time_minutes(text: &str) -> usize {
    count_words(text).div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render_markdown("# Title\n\nSome **bold** text.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn renders_code_blocks_with_language() {
        let html = render_markdown("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="language-rust">"#));
    }

    #[test]
    fn counts_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("  hello \n\t world  "), 2);
    }

    #[test]
    fn reading_time_rounds_up_with_floor_of_one() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
        assert_eq!(reading_time_minutes(&"word ".repeat(1000)), 5);
    }
}
