use std::fs;

use promptmock_core::{PromptMockError, Runnable};
use promptmock_fixtures::{ProcessorConfig, PromptDirectoryProcessor};
use promptmock_llm::{CompletionRequest, MockCompletionLlm};
use tempfile::tempdir;

#[tokio::test]
async fn mock_answers_from_a_fixture_tree() {
    let root = tempdir().expect("temp dir");
    let dir = root.path().join("translate");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("prompt.txt"), "Translate: hello\n").expect("write prompt");
    fs::write(
        dir.join("output_0_7.txt"),
        "Translate: helloBonjour---Translate: helloSalut\n",
    )
    .expect("write output");

    let config = ProcessorConfig::new(64).with_n(2);
    let processor = PromptDirectoryProcessor::new(config).expect("processor");
    let llm = MockCompletionLlm::from_fixture_dir(root.path(), processor).expect("load");

    let request = CompletionRequest::new("Translate: hello", "0.7".parse().expect("temp"), 64)
        .with_n(Some(2));
    let response = llm.invoke(request).await.expect("invoke");

    let texts: Vec<_> = response.choices.into_iter().map(|c| c.text).collect();
    assert_eq!(texts, vec!["Bonjour", "Salut"]);
}

#[tokio::test]
async fn fixture_errors_surface_as_prompt_mock_errors() {
    let root = tempdir().expect("temp dir");
    let missing = root.path().join("missing");
    let processor = PromptDirectoryProcessor::new(ProcessorConfig::new(64)).expect("processor");

    let err = MockCompletionLlm::from_fixture_dir(&missing, processor).expect_err("missing root");

    assert!(matches!(err, PromptMockError::Fixture(_)));
}
