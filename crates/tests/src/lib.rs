//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约行为测试 (fan-out / commit / 计时)
//! - 多 stage 拓扑组合
//! - 配置 → 监控 端到端流程

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use contracts::{CommitToken, ContractError, Message, Pump, Source};

    /// Shared call journal, in invocation order
    pub type Journal = Arc<Mutex<Vec<String>>>;

    pub fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    /// Pump journaling every call
    pub struct RecordingPump {
        pub name: String,
        pub journal: Journal,
        pub fail: bool,
    }

    impl RecordingPump {
        pub fn boxed(name: &str, journal: &Journal, fail: bool) -> Box<dyn Pump> {
            Box::new(Self {
                name: name.to_string(),
                journal: Arc::clone(journal),
                fail,
            })
        }
    }

    impl Pump for RecordingPump {
        fn name(&self) -> &str {
            &self.name
        }

        fn process(&mut self, msg: &Message) -> Result<(), ContractError> {
            let payload = String::from_utf8_lossy(msg.value()).to_string();
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, payload));
            if self.fail {
                return Err(ContractError::process(&self.name, "rejected"));
            }
            Ok(())
        }
    }

    /// Source journaling every acknowledged token
    pub struct RecordingSource {
        pub name: String,
        pub journal: Journal,
        pub fail: bool,
    }

    impl RecordingSource {
        pub fn shared(name: &str, journal: &Journal, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                journal: Arc::clone(journal),
                fail,
            })
        }
    }

    impl Source for RecordingSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn commit(&self, token: &CommitToken) -> Result<(), ContractError> {
            let token = token
                .downcast_ref::<&'static str>()
                .copied()
                .unwrap_or("?");
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, token));
            if self.fail {
                return Err(ContractError::commit(&self.name, "unavailable"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use std::time::Duration;

    use contracts::{CommitToken, ContractError, Message, Pipe, TimedPipe};
    use pipe::ProcessorPipe;

    use crate::support::{entries, journal, RecordingPump, RecordingSource};

    #[test]
    fn test_fan_out_stops_at_failing_child() {
        let journal = journal();
        let mut pipe: Box<dyn Pipe> = Box::new(ProcessorPipe::new(vec![
            RecordingPump::boxed("A", &journal, false),
            RecordingPump::boxed("B", &journal, true),
            RecordingPump::boxed("C", &journal, false),
        ]));

        let err = pipe.forward_all(&Message::new("m1")).unwrap_err();

        assert!(matches!(err, ContractError::Process { ref node, .. } if node == "B"));
        assert_eq!(entries(&journal), vec!["A:m1", "B:m1"]);
    }

    #[test]
    fn test_forward_to_out_of_bounds_invokes_nobody() {
        let journal = journal();
        let mut pipe = ProcessorPipe::new(vec![
            RecordingPump::boxed("A", &journal, false),
            RecordingPump::boxed("B", &journal, false),
        ]);

        let err = pipe.forward_to(&Message::new("m1"), 2).unwrap_err();

        assert!(matches!(
            err,
            ContractError::ChildIndexOutOfBounds { index: 2, len: 2 }
        ));
        assert!(entries(&journal).is_empty());
    }

    #[test]
    fn test_commit_reaches_every_source_once() {
        let journal = journal();
        let source_x = RecordingSource::shared("SourceX", &journal, false);
        let source_y = RecordingSource::shared("SourceY", &journal, false);
        let msg = Message::new("m1")
            .with_origin(source_x, CommitToken::new("tok1"))
            .with_origin(source_y, CommitToken::new("tok2"));

        let mut pipe = ProcessorPipe::default();
        pipe.commit(&msg).unwrap();

        assert_eq!(entries(&journal), vec!["SourceX:tok1", "SourceY:tok2"]);
    }

    #[test]
    fn test_commit_error_is_returned_unchanged() {
        let journal = journal();
        let down = RecordingSource::shared("down", &journal, true);
        let never = RecordingSource::shared("never", &journal, false);
        let msg = Message::new("m1")
            .with_origin(down, CommitToken::new("t1"))
            .with_origin(never, CommitToken::new("t2"));

        let mut pipe = ProcessorPipe::default();
        let err = pipe.commit(&msg).unwrap_err();

        assert_eq!(err.to_string(), "source 'down' commit error: unavailable");
        assert_eq!(entries(&journal), vec!["down:t1"]);
    }

    #[test]
    fn test_duration_through_trait_objects() {
        let journal = journal();
        let mut pipe = ProcessorPipe::new(vec![RecordingPump::boxed("A", &journal, true)]);

        assert_eq!(TimedPipe::duration(&pipe), Duration::ZERO);
        for _ in 0..3 {
            assert!(pipe.forward_all(&Message::new("x")).is_err());
        }
        let accrued = pipe.duration();
        for _ in 0..1_000 {
            assert!(pipe.forward_to(&Message::new("x"), 9).is_err());
        }
        assert!(pipe.duration() > accrued);

        let timed: &mut dyn TimedPipe = &mut pipe;
        timed.reset();
        assert_eq!(timed.duration(), Duration::ZERO);
    }
}

#[cfg(test)]
mod topology_tests {
    use std::sync::Arc;

    use contracts::{CommitToken, ContractError, Message, Pipe, Pump};
    use pipe::ProcessorPipe;
    use tokio::sync::Mutex;

    use crate::support::{entries, journal, RecordingPump, RecordingSource};

    /// Stage that upper-cases payloads and forwards through its own pipe
    struct UppercaseStage {
        name: String,
        pipe: ProcessorPipe,
    }

    impl Pump for UppercaseStage {
        fn name(&self) -> &str {
            &self.name
        }

        fn process(&mut self, msg: &Message) -> Result<(), ContractError> {
            let upper = String::from_utf8_lossy(msg.value()).to_uppercase();
            let out = Message::new(upper).with_metadata(msg.metadata().clone());
            self.pipe.forward_all(&out)?;
            self.pipe.commit(&out)
        }
    }

    #[test]
    fn test_two_stage_topology() {
        let journal = journal();
        let source = RecordingSource::shared("orders", &journal, false);

        let stage = UppercaseStage {
            name: "upper".to_string(),
            pipe: ProcessorPipe::new(vec![
                RecordingPump::boxed("sink-a", &journal, false),
                RecordingPump::boxed("sink-b", &journal, false),
            ]),
        };
        let mut root = ProcessorPipe::new(vec![Box::new(stage)]);

        let msg = Message::new("abc").with_origin(source, CommitToken::new("7"));
        root.forward_all(&msg).unwrap();

        assert_eq!(
            entries(&journal),
            vec!["sink-a:ABC", "sink-b:ABC", "orders:7"]
        );
    }

    #[test]
    fn test_grandchild_error_surfaces_at_root() {
        let journal = journal();
        let stage = UppercaseStage {
            name: "upper".to_string(),
            pipe: ProcessorPipe::new(vec![RecordingPump::boxed("sink", &journal, true)]),
        };
        let mut root = ProcessorPipe::new(vec![
            Box::new(stage),
            RecordingPump::boxed("audit", &journal, false),
        ]);

        let err = root.forward_all(&Message::new("abc")).unwrap_err();

        assert!(matches!(err, ContractError::Process { ref node, .. } if node == "sink"));
        assert_eq!(entries(&journal), vec!["sink:ABC"]);
    }

    #[tokio::test]
    async fn test_shared_pipe_behind_external_lock() {
        let journal = journal();
        let pipe = Arc::new(Mutex::new(ProcessorPipe::new(vec![RecordingPump::boxed(
            "sink", &journal, false,
        )])));

        let mut handles = Vec::new();
        for i in 0..8 {
            let pipe = Arc::clone(&pipe);
            handles.push(tokio::spawn(async move {
                let msg = Message::new(format!("m{i}"));
                pipe.lock().await.forward_all(&msg)
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(entries(&journal).len(), 8);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Message, Pipe, TimedPipe};
    use observability::PipeMonitor;
    use pipe::ProcessorPipe;

    use crate::support::{journal, RecordingPump};

    /// Config -> pipe -> monitor windows
    #[test]
    fn test_reporting_windows_from_config() {
        let config = ConfigLoader::load_from_str(
            r#"
[monitor]
report_interval_ms = 1

[bench]
consumers = 2
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let journal = journal();
        let children = (0..config.bench.consumers)
            .map(|i| RecordingPump::boxed(&format!("c{i}"), &journal, false))
            .collect();
        let mut pipe = ProcessorPipe::new(children);
        let mut monitor = PipeMonitor::new();

        for window in 0..3 {
            for _ in 0..10 {
                pipe.forward_all(&Message::new("x")).unwrap();
                monitor.note_forward("stage", true);
            }
            std::thread::sleep(config.monitor.report_interval());
            monitor.observe("stage", &mut pipe);
            assert_eq!(pipe.duration(), Duration::ZERO, "window {window}");
        }

        let summary = monitor.summary();
        let stage = summary.stage("stage").unwrap();
        assert_eq!(stage.windows, 3);
        assert_eq!(stage.forwards, 30);
        assert_eq!(journal.lock().unwrap().len(), 60);
    }
}
