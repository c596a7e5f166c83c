use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use url::Url;

use crate::config::Config;
use crate::cost::CostTracker;
use crate::generator::agents::{
    ContentExtractor, ExtractedContent, ImageSelector, IntentClassifier, LessonMaterials,
    QualityAssessor, SlideGenerator, TeachingSynthesizer, follow_up_suggestions,
};
use crate::generator::context::GeneratorContext;
use crate::generator::outlet;
use crate::search::{SearchRouter, WebSearchAgent, collect_unique_images, search_summary};
use crate::types::{
    ImageData, IntentAnalysis, ResearchRequest, SearchPlan, SearchResult, Source, SourceType,
    TeachingResponse,
};

/// 送去挑选的候选图片上限
const RAW_IMAGE_LIMIT: usize = 10;
/// 来源摘要的字符数
const SNIPPET_CHARS: usize = 200;

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<String, Instant>,
    phase_durations: HashMap<String, Duration>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: HashMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .insert(phase_name.to_string(), Instant::now());
    }

    /// 结束一个阶段的计时，重试时同一阶段的耗时会累加
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let start_time = self.phase_start_times.remove(phase_name)?;
        let duration = start_time.elapsed();
        *self
            .phase_durations
            .entry(phase_name.to_string())
            .or_default() += duration;
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn get_phase_duration(&self, phase_name: &str) -> Option<Duration> {
        self.phase_durations.get(phase_name).copied()
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for phase in TimingKeys::get_all_phase_keys() {
                if let Some(duration) = self.phase_durations.get(phase) {
                    report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
                }
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const INTENT: &'static str = "intent";
    pub const SEARCH: &'static str = "search";
    pub const RESEARCH: &'static str = "research";
    pub const SYNTHESIS: &'static str = "synthesis";
    pub const QUALITY: &'static str = "quality";
    pub const SLIDES: &'static str = "slides";

    /// 获取所有阶段的键列表
    pub fn get_all_phase_keys() -> Vec<&'static str> {
        vec![
            Self::INTENT,
            Self::SEARCH,
            Self::RESEARCH,
            Self::SYNTHESIS,
            Self::QUALITY,
            Self::SLIDES,
        ]
    }
}

/// 教学流程编排：意图 → 规划 → 搜索 → 提取/配图 → 合成 → 质量评估 → 幻灯片(可选)
pub struct TeachingOrchestrator {
    context: GeneratorContext,
    router: SearchRouter,
    search_agent: WebSearchAgent,
    intent_classifier: IntentClassifier,
    content_extractor: ContentExtractor,
    image_selector: ImageSelector,
    synthesizer: TeachingSynthesizer,
    quality: QualityAssessor,
    slide_generator: SlideGenerator,
}

impl TeachingOrchestrator {
    pub fn new(context: GeneratorContext) -> Self {
        let llm = context.llm_client.clone();
        let search_agent = WebSearchAgent::new(
            context.search_provider.clone(),
            context.search_cache.clone(),
            context.config.search.clone(),
        );
        Self {
            router: SearchRouter::new(),
            search_agent,
            intent_classifier: IntentClassifier::new(llm.clone()),
            content_extractor: ContentExtractor::new(llm.clone()),
            image_selector: ImageSelector::default(),
            synthesizer: TeachingSynthesizer::new(llm.clone()),
            slide_generator: SlideGenerator::new(llm),
            quality: QualityAssessor::new(context.config.max_retries),
            context,
        }
    }

    /// 处理一个问题，返回完整的教学响应
    pub async fn process_question(&self, request: &ResearchRequest) -> Result<TeachingResponse> {
        let mut timing = TimingScope::new();
        let cost = CostTracker::new();
        let question = request.enriched_question();
        // 搜索只用学生的原始问题，附件内容只进入意图分析和合成
        let search_question = request.question.trim();

        tracing::info!("🚀 开始处理问题: {}", search_question);

        timing.start_phase(TimingKeys::INTENT);
        let intent = self.intent_classifier.analyze(&question, &cost).await;
        timing.end_phase(TimingKeys::INTENT);

        let mut retries = 0;
        let mut response = loop {
            let plan =
                self.router
                    .plan(search_question, Some(&intent), self.context.config.force_images);
            let queries = self
                .router
                .generate_queries(search_question, Some(&intent), &plan);
            tracing::info!("🔍 生成{}条搜索查询: {:?}", queries.len(), queries);

            timing.start_phase(TimingKeys::SEARCH);
            let results = self
                .search_agent
                .multi_query_search(&queries, Some(&plan), &cost)
                .await;
            timing.end_phase(TimingKeys::SEARCH);

            timing.start_phase(TimingKeys::RESEARCH);
            let (extracted, images) = tokio::join!(
                self.content_extractor
                    .process_multiple(&results, &question, &cost),
                self.select_images(search_question, &intent, &plan, &results, &cost)
            );
            timing.end_phase(TimingKeys::RESEARCH);
            let materials = LessonMaterials {
                sources: build_sources(&extracted),
                extracted,
                images,
                search_summary: search_summary(&results).map(str::to_string),
            };

            timing.start_phase(TimingKeys::SYNTHESIS);
            let response = self
                .synthesizer
                .synthesize(request, &intent, materials, &cost)
                .await
                .context("教学内容合成失败")?;
            timing.end_phase(TimingKeys::SYNTHESIS);

            timing.start_phase(TimingKeys::QUALITY);
            let score = self.quality.score(&response);
            timing.end_phase(TimingKeys::QUALITY);
            tracing::info!("📊 质量得分: {:.2}", score);

            if self.quality.should_retry(score, retries) {
                retries += 1;
                tracing::warn!(
                    "⚠️ 质量过低({:.2})，重新检索 ({}/{})",
                    score,
                    retries,
                    self.context.config.max_retries
                );
                continue;
            }
            break response;
        };

        if let Some(num_slides) = self.context.config.slides {
            timing.start_phase(TimingKeys::SLIDES);
            let deck = self
                .slide_generator
                .generate(&short_topic(search_question), num_slides, &intent, &cost)
                .await;
            timing.end_phase(TimingKeys::SLIDES);
            response.slides = Some(deck);
        }

        response.follow_up_suggestions = follow_up_suggestions(search_question);
        response.processing_time = timing.get_total_duration().as_secs_f64();
        response.cost = Some(cost.summary());

        if let Some(path) = &self.context.config.cost_log_path {
            cost.append_to_log(path);
        }

        tracing::info!("⏱️ {}", timing.generate_timing_report());
        tracing::info!(
            credits = cost.credits(),
            llm_calls = cost.summary().llm_calls,
            "✅ 处理完成，耗时{:.2}秒",
            response.processing_time
        );
        Ok(response)
    }

    /// 挑选配图；主搜索没有图片时补一次专门的图片搜索
    async fn select_images(
        &self,
        topic: &str,
        intent: &IntentAnalysis,
        plan: &SearchPlan,
        results: &[SearchResult],
        cost: &CostTracker,
    ) -> Vec<ImageData> {
        let mut raw_images = collect_unique_images(results, RAW_IMAGE_LIMIT);

        if raw_images.is_empty() && plan.include_images {
            let image_query = format!("{} diagram illustration", short_topic(topic));
            tracing::info!("🖼️ 主搜索没有图片，执行专门的图片搜索: {}", image_query);
            let image_results = self.search_agent.search(&image_query, None, cost).await;
            raw_images = collect_unique_images(&image_results, RAW_IMAGE_LIMIT);
            tracing::info!("专门的图片搜索找到{}张图片", raw_images.len());
        }

        self.image_selector
            .select(&raw_images, topic, &intent.key_concepts)
    }
}

/// 取问题首行的前120个字符作为图片搜索主题
pub fn short_topic(question: &str) -> String {
    let first_line = question.trim().lines().next().unwrap_or_default();
    let mut topic: String = first_line.chars().take(120).collect();
    for prefix in ["Teach me about '", "Teach me about "] {
        if let Some(rest) = topic.strip_prefix(prefix) {
            topic = rest
                .trim_end_matches('\'')
                .split('\'')
                .next()
                .unwrap_or(rest)
                .to_string();
            break;
        }
    }
    topic
}

fn build_sources(extracted: &[ExtractedContent]) -> Vec<Source> {
    extracted
        .iter()
        .map(|item| Source {
            title: item.source.title.clone(),
            url: item.source.url.clone(),
            snippet: item.content.chars().take(SNIPPET_CHARS).collect(),
            domain: extract_domain(&item.source.url),
            relevance_score: item.source.score,
            source_type: SourceType::Article,
            published_date: None,
        })
        .collect()
}

/// 提取URL的域名并去掉www前缀，无法解析时原样返回
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host.trim_start_matches("www.").to_string(),
        None => url.to_string(),
    }
}

/// 处理一个问题并把结果写入输出目录
pub async fn launch(config: &Config, request: ResearchRequest) -> Result<TeachingResponse> {
    let context = GeneratorContext::new(config.clone())?;
    let orchestrator = TeachingOrchestrator::new(context.clone());

    let response = orchestrator.process_question(&request).await?;
    outlet::save(&config.output_path, &response).await?;

    let report = context.search_cache.generate_performance_report();
    tracing::info!("💾 {}", report.summary_line());

    Ok(response)
}
