use super::{LOW_QUALITY_DOMAINS, SearchRouter};
use crate::types::{
    DifficultyLevel, IntentAnalysis, QuestionType, SearchComplexity, SearchDepth,
};

fn intent(
    difficulty: DifficultyLevel,
    question_type: QuestionType,
    concepts: &[&str],
    confidence: f64,
) -> IntentAnalysis {
    IntentAnalysis {
        difficulty_level: difficulty,
        question_type,
        requires_visuals: false,
        requires_math: false,
        requires_code: false,
        key_concepts: concepts.iter().map(|c| c.to_string()).collect(),
        confidence,
    }
}

fn beginner_conceptual() -> IntentAnalysis {
    intent(
        DifficultyLevel::Beginner,
        QuestionType::Conceptual,
        &["photosynthesis"],
        0.9,
    )
}

#[test]
fn test_missing_intent_is_moderate() {
    let router = SearchRouter::new();
    assert_eq!(
        router.classify_complexity(None, "What is photosynthesis?"),
        SearchComplexity::Moderate
    );
}

#[test]
fn test_simple_requires_every_condition() {
    let router = SearchRouter::new();
    let query = "What is photosynthesis?";

    let simple = beginner_conceptual();
    assert_eq!(
        router.classify_complexity(Some(&simple), query),
        SearchComplexity::Simple
    );

    let practical = IntentAnalysis {
        question_type: QuestionType::Practical,
        ..beginner_conceptual()
    };
    assert_eq!(
        router.classify_complexity(Some(&practical), query),
        SearchComplexity::Simple
    );

    let low_confidence = IntentAnalysis {
        confidence: 0.74,
        ..beginner_conceptual()
    };
    assert_eq!(
        router.classify_complexity(Some(&low_confidence), query),
        SearchComplexity::Moderate
    );

    let intermediate = IntentAnalysis {
        difficulty_level: DifficultyLevel::Intermediate,
        ..beginner_conceptual()
    };
    assert_eq!(
        router.classify_complexity(Some(&intermediate), query),
        SearchComplexity::Moderate
    );

    let mixed = IntentAnalysis {
        question_type: QuestionType::Mixed,
        ..beginner_conceptual()
    };
    assert_eq!(
        router.classify_complexity(Some(&mixed), query),
        SearchComplexity::Moderate
    );

    let three_concepts = intent(
        DifficultyLevel::Beginner,
        QuestionType::Conceptual,
        &["a", "b", "c"],
        0.9,
    );
    assert_eq!(
        router.classify_complexity(Some(&three_concepts), query),
        SearchComplexity::Moderate
    );
}

#[test]
fn test_simple_word_count_boundary() {
    let router = SearchRouter::new();
    let fifteen = vec!["word"; 15].join(" ");
    let sixteen = vec!["word"; 16].join(" ");

    assert_eq!(
        router.classify_complexity(Some(&beginner_conceptual()), &fifteen),
        SearchComplexity::Simple
    );
    assert_eq!(
        router.classify_complexity(Some(&beginner_conceptual()), &sixteen),
        SearchComplexity::Moderate
    );
}

#[test]
fn test_advanced_is_always_complex() {
    let router = SearchRouter::new();
    for question_type in [
        QuestionType::Conceptual,
        QuestionType::Practical,
        QuestionType::Mathematical,
        QuestionType::Mixed,
    ] {
        for confidence in [0.0, 0.5, 1.0] {
            let advanced = intent(DifficultyLevel::Advanced, question_type, &[], confidence);
            assert_eq!(
                router.classify_complexity(Some(&advanced), "short question"),
                SearchComplexity::Complex
            );
        }
    }
}

#[test]
fn test_complex_triggers() {
    let router = SearchRouter::new();
    let base = intent(
        DifficultyLevel::Intermediate,
        QuestionType::Conceptual,
        &["x"],
        0.6,
    );
    assert_eq!(
        router.classify_complexity(Some(&base), "a question"),
        SearchComplexity::Moderate
    );

    let mathematical = IntentAnalysis {
        question_type: QuestionType::Mathematical,
        ..base.clone()
    };
    assert_eq!(
        router.classify_complexity(Some(&mathematical), "a question"),
        SearchComplexity::Complex
    );

    let math_and_code = IntentAnalysis {
        requires_math: true,
        requires_code: true,
        ..base.clone()
    };
    assert_eq!(
        router.classify_complexity(Some(&math_and_code), "a question"),
        SearchComplexity::Complex
    );

    let math_only = IntentAnalysis {
        requires_math: true,
        ..base.clone()
    };
    assert_eq!(
        router.classify_complexity(Some(&math_only), "a question"),
        SearchComplexity::Moderate
    );

    let many_concepts = intent(
        DifficultyLevel::Intermediate,
        QuestionType::Conceptual,
        &["a", "b", "c", "d", "e"],
        0.6,
    );
    assert_eq!(
        router.classify_complexity(Some(&many_concepts), "a question"),
        SearchComplexity::Complex
    );

    let forty = vec!["w"; 40].join(" ");
    let forty_one = vec!["w"; 41].join(" ");
    assert_eq!(
        router.classify_complexity(Some(&base), &forty),
        SearchComplexity::Moderate
    );
    assert_eq!(
        router.classify_complexity(Some(&base), &forty_one),
        SearchComplexity::Complex
    );
}

#[test]
fn test_plan_presets() {
    let router = SearchRouter::new();

    let simple = router.plan("What is photosynthesis?", Some(&beginner_conceptual()), false);
    assert_eq!(simple.search_depth, SearchDepth::Basic);
    assert_eq!(
        (simple.max_results, simple.num_queries, simple.context_budget_chars),
        (3, 1, 4000)
    );
    assert!(!simple.include_raw_content);

    let moderate = router.plan("What is photosynthesis?", None, false);
    assert_eq!(moderate.complexity, SearchComplexity::Moderate);
    assert_eq!(moderate.search_depth, SearchDepth::Basic);
    assert_eq!(
        (moderate.max_results, moderate.num_queries, moderate.context_budget_chars),
        (5, 2, 6000)
    );
    assert!(!moderate.include_raw_content);

    let advanced = intent(DifficultyLevel::Advanced, QuestionType::Mixed, &[], 0.9);
    let complex = router.plan("q", Some(&advanced), false);
    assert_eq!(complex.search_depth, SearchDepth::Advanced);
    assert_eq!(
        (complex.max_results, complex.num_queries, complex.context_budget_chars),
        (7, 3, 12000)
    );
    assert!(complex.include_raw_content);

    for plan in [&simple, &moderate, &complex] {
        assert!(plan.include_answer);
        assert!(plan.include_domains.is_empty());
        assert_eq!(plan.exclude_domains.len(), LOW_QUALITY_DOMAINS.len());
        assert!(plan.time_range.is_none());
        assert!(plan.num_queries >= 1 && plan.max_results >= 1);
        assert!(plan.context_budget_chars > 0);
        // advanced当且仅当COMPLEX
        assert_eq!(
            plan.search_depth == SearchDepth::Advanced,
            plan.complexity == SearchComplexity::Complex
        );
    }
}

#[test]
fn test_plan_image_flag() {
    let router = SearchRouter::new();
    let no_visuals = beginner_conceptual();

    assert!(!router.plan("q", Some(&no_visuals), false).include_images);
    assert!(router.plan("q", Some(&no_visuals), true).include_images);
    // 没有意图时默认请求图片
    assert!(router.plan("q", None, false).include_images);

    let visuals = IntentAnalysis {
        requires_visuals: true,
        ..no_visuals
    };
    assert!(router.plan("q", Some(&visuals), false).include_images);
}

#[test]
fn test_plan_is_deterministic() {
    let router = SearchRouter::new();
    let intent = intent(
        DifficultyLevel::Intermediate,
        QuestionType::Practical,
        &["rust", "ownership"],
        0.8,
    );
    let a = router.plan("How does ownership work in Rust?", Some(&intent), true);
    let b = router.plan("How does ownership work in Rust?", Some(&intent), true);
    assert_eq!(a, b);
}

#[test]
fn test_estimated_cost_weight() {
    let router = SearchRouter::new();
    let simple = router.plan("What is photosynthesis?", Some(&beginner_conceptual()), false);
    assert!((simple.estimated_cost_weight() - 1.0).abs() < f64::EPSILON);

    let moderate = router.plan("q", None, false);
    assert!((moderate.estimated_cost_weight() - 2.0).abs() < f64::EPSILON);

    let advanced = intent(DifficultyLevel::Advanced, QuestionType::Mixed, &[], 0.9);
    let complex = router.plan("q", Some(&advanced), false);
    // 2.0 (advanced) * 3 (queries) * 1.5 (raw)
    assert!((complex.estimated_cost_weight() - 9.0).abs() < f64::EPSILON);
}

#[test]
fn test_photosynthesis_scenario() {
    let router = SearchRouter::new();
    let question = "What is photosynthesis?";
    let intent = IntentAnalysis {
        requires_visuals: true,
        ..beginner_conceptual()
    };

    let plan = router.plan(question, Some(&intent), false);
    assert_eq!(plan.complexity, SearchComplexity::Simple);
    assert_eq!(plan.max_results, 3);
    assert_eq!(plan.num_queries, 1);
    assert_eq!(plan.search_depth, SearchDepth::Basic);

    let queries = router.generate_queries(question, Some(&intent), &plan);
    assert_eq!(queries, vec!["What is photosynthesis?".to_string()]);
}

#[test]
fn test_schrodinger_scenario() {
    let router = SearchRouter::new();
    let question = "Derive the time-independent Schrödinger equation for a particle in a box and discuss boundary conditions";
    let intent = IntentAnalysis {
        requires_math: true,
        ..intent(DifficultyLevel::Advanced, QuestionType::Conceptual, &[], 0.8)
    };

    let plan = router.plan(question, Some(&intent), false);
    assert_eq!(plan.complexity, SearchComplexity::Complex);
    assert_eq!(plan.search_depth, SearchDepth::Advanced);
    assert_eq!(plan.num_queries, 3);
    assert!(plan.include_raw_content);

    let queries = router.generate_queries(question, Some(&intent), &plan);
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0], question);
    assert_eq!(queries[1], format!("{} detailed explanation", question));
    assert!(queries[2].contains("formula derivation proof"));
}

#[test]
fn test_two_query_expansion() {
    let router = SearchRouter::new();
    let plan = router.plan("q", None, false);
    assert_eq!(plan.num_queries, 2);

    let with_concepts = intent(
        DifficultyLevel::Intermediate,
        QuestionType::Conceptual,
        &["entropy", "enthalpy", "gibbs", "kinetics"],
        0.5,
    );
    assert_eq!(
        router.generate_queries("Why do reactions happen?", Some(&with_concepts), &plan),
        vec![
            "Why do reactions happen?".to_string(),
            "entropy enthalpy gibbs explained with examples".to_string(),
        ]
    );

    assert_eq!(
        router.generate_queries("Why do reactions happen?", None, &plan),
        vec![
            "Why do reactions happen?".to_string(),
            "Why do reactions happen? tutorial explanation".to_string(),
        ]
    );
}

#[test]
fn test_specialised_query_priority() {
    let router = SearchRouter::new();
    let base = intent(DifficultyLevel::Advanced, QuestionType::Mixed, &["a", "b", "c"], 0.9);
    let plan = router.plan("Q", Some(&base), false);

    let cases = [
        ((true, true, true), "Q formula derivation proof"),
        ((false, true, true), "Q code implementation example"),
        ((false, false, true), "Q diagram visual illustration"),
        ((false, false, false), "Q examples applications"),
    ];
    for ((math, code, visuals), expected) in cases {
        let i = IntentAnalysis {
            requires_math: math,
            requires_code: code,
            requires_visuals: visuals,
            ..base.clone()
        };
        let queries = router.generate_queries("Q", Some(&i), &plan);
        assert_eq!(queries[1], "a b in-depth explanation");
        assert_eq!(queries[2], expected);
    }
}

#[test]
fn test_generated_queries_are_unique_and_bounded() {
    let router = SearchRouter::new();
    let plan = router.plan("q", None, false);
    // 概念扩展与原问题只差大小写和空白时被去重，且不回填
    let echo = intent(
        DifficultyLevel::Intermediate,
        QuestionType::Conceptual,
        &["Photosynthesis"],
        0.5,
    );
    let question = "  photosynthesis EXPLAINED with examples ";
    let queries = router.generate_queries(question, Some(&echo), &plan);
    assert_eq!(queries, vec![question.to_string()]);
    assert!(queries.len() <= plan.num_queries);

    let distinct = intent(
        DifficultyLevel::Intermediate,
        QuestionType::Conceptual,
        &["chlorophyll"],
        0.5,
    );
    let queries = router.generate_queries(question, Some(&distinct), &plan);
    assert_eq!(queries.len(), 2);

    let mut seen = std::collections::HashSet::new();
    for q in &queries {
        assert!(seen.insert(q.trim().to_lowercase()));
    }
}
