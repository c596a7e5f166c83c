#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::LLMProvider;
    use clap::Parser;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["teachflow", "What is photosynthesis?"]).unwrap();

        assert_eq!(args.question, "What is photosynthesis?");
        assert!(args.config.is_none());
        assert!(args.output_path.is_none());
        assert!(args.file_context.is_none());
        assert!(!args.force_images);
        assert!(!args.no_cache);
        assert!(args.slides.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_require_question() {
        assert!(Args::try_parse_from(["teachflow"]).is_err());
    }

    #[test]
    fn test_args_long_options() {
        let args = Args::try_parse_from([
            "teachflow",
            "Explain entropy",
            "--output-path",
            "/tmp/lessons",
            "--image-context",
            "a whiteboard sketch",
            "--llm-provider",
            "openai",
            "--max-retries",
            "1",
            "--force-images",
            "--no-cache",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.output_path, Some(PathBuf::from("/tmp/lessons")));
        assert_eq!(args.image_context.as_deref(), Some("a whiteboard sketch"));
        assert_eq!(args.llm_provider.as_deref(), Some("openai"));
        assert_eq!(args.max_retries, Some(1));
        assert!(args.force_images);
        assert!(args.no_cache);
        assert!(args.verbose);
    }

    #[test]
    fn test_into_config_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_retries = 5\n[llm]\nmodel_efficient = \"from-file\"").unwrap();

        let args = Args::try_parse_from([
            "teachflow",
            "Explain entropy",
            "--config",
            file.path().to_str().unwrap(),
            "--llm-provider",
            "anthropic",
            "--model-powerful",
            "big-model",
            "--tavily-api-key",
            "tvly-test",
            "--max-retries",
            "1",
            "--no-cache",
            "--force-images",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.llm.provider, LLMProvider::Anthropic);
        assert_eq!(config.llm.model_efficient, "from-file");
        assert_eq!(config.llm.model_powerful, "big-model");
        assert_eq!(config.search.tavily_api_key, "tvly-test");
        assert_eq!(config.max_retries, 1);
        assert!(!config.cache.enabled);
        assert!(config.force_images);
    }

    #[test]
    fn test_into_config_keeps_file_values_without_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_retries = 5\noutput_path = \"lessons\"").unwrap();

        let args = Args::try_parse_from([
            "teachflow",
            "q",
            "--config",
            file.path().to_str().unwrap(),
            "--llm-provider",
            "nonsense",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.output_path, PathBuf::from("lessons"));
        assert_eq!(config.llm.provider, LLMProvider::default());
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_into_config_missing_file_is_error() {
        let args = Args::try_parse_from([
            "teachflow",
            "q",
            "--config",
            "/definitely/not/here/teachflow.toml",
        ])
        .unwrap();
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_to_request_reads_file_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Chapter 3: the light reactions").unwrap();

        let args = Args::try_parse_from([
            "teachflow",
            "What happens in the light reactions?",
            "--file-context",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let request = args.to_request().unwrap();

        assert_eq!(request.question, "What happens in the light reactions?");
        assert_eq!(
            request.file_context.as_deref(),
            Some("Chapter 3: the light reactions")
        );
        assert!(request.image_context.is_none());
    }

    #[test]
    fn test_to_request_missing_file_is_error() {
        let args = Args::try_parse_from([
            "teachflow",
            "q",
            "--file-context",
            "/definitely/not/here.txt",
        ])
        .unwrap();
        assert!(args.to_request().is_err());
    }

    #[test]
    fn test_slides_flag_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "slides = 12").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::try_parse_from(["teachflow", "q", "--config", &path, "--slides", "8"])
            .unwrap();
        assert_eq!(args.into_config().unwrap().slides, Some(8));

        let args = Args::try_parse_from(["teachflow", "q", "--config", &path]).unwrap();
        assert_eq!(args.into_config().unwrap().slides, Some(12));
    }

    #[test]
    fn test_verbose_from_file_survives_without_flag() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "verbose = true").unwrap();

        let args = Args::try_parse_from([
            "teachflow",
            "q",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert!(config.verbose);
        assert_eq!(config.log_level(), "debug");
    }
}
