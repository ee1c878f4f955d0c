// Prompt assembly for model-backed engines
//
// A real engine hands this prompt to its model provider. Kept here so
// engine implementations share one prompt shape.

/// Parameters for prompt assembly.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub query: &'a str,
    pub target_countries: &'a [&'a str],
    pub source_countries: &'a [&'a str],
    pub effort: u8,
    pub language: &'a str,
}

/// Build the press-monitoring analysis prompt.
pub fn build_research_prompt(ctx: &PromptContext<'_>) -> String {
    let targets = join_country_names(ctx.target_countries);
    let sources = join_country_names(ctx.source_countries);
    let depth = effort_depth(ctx.effort);
    let lang = language_name(ctx.language);

    format!(
        "You are an expert press monitoring and media analysis system specializing in \
         global news coverage about {targets}.\n\n\
         Your task: analyze recent press coverage about {targets} in media outlets from \
         {sources}.\n\n\
         Analysis depth: {depth}\n\
         Response language: {lang}\n\n\
         User query: \"{query}\"\n\n\
         Format the response with these sections: Executive Summary, Key Findings, \
         Sentiment Analysis, Major Themes, Notable Articles, Regional Perspectives, \
         Trends and Patterns, Recommendations.\n\n\
         Be objective and balanced, cite specific examples where relevant, and respond \
         entirely in {lang}.",
        targets = targets,
        sources = sources,
        depth = depth,
        lang = lang,
        query = ctx.query,
    )
}

fn effort_depth(effort: u8) -> &'static str {
    match effort {
        0 | 1 => "quick scan with 3-5 key points",
        2 => "basic analysis with 5-10 findings",
        3 => "standard analysis with 10-15 detailed findings",
        4 => "comprehensive review with 15+ findings",
        _ => "exhaustive analysis with deep insights",
    }
}

fn join_country_names(codes: &[&str]) -> String {
    if codes.is_empty() {
        return "all monitored regions".to_string();
    }
    codes
        .iter()
        .map(|c| country_name(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn country_name(code: &str) -> &str {
    match code {
        "AZ" => "Azerbaijan",
        "GE" => "Georgia",
        "AM" => "Armenia",
        "TR" => "Turkey",
        "RU" => "Russia",
        "IR" => "Iran",
        "US" => "United States",
        "UK" => "United Kingdom",
        "DE" => "Germany",
        "FR" => "France",
        "CN" => "China",
        "KZ" => "Kazakhstan",
        "UZ" => "Uzbekistan",
        "TM" => "Turkmenistan",
        "KG" => "Kyrgyzstan",
        "TJ" => "Tajikistan",
        "UA" => "Ukraine",
        other => other,
    }
}

fn language_name(code: &str) -> &str {
    match code {
        "az" => "Azerbaijani",
        "ru" => "Russian",
        "tr" => "Turkish",
        _ => "English",
    }
}
