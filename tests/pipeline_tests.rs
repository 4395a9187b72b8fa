#[cfg(test)]
mod mailbox_proptests {
    use proptest::prelude::*;

    use qrlive::Mailbox;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Submit,
        Take,
    }

    fn op_strategy() -> BoxedStrategy<Op> {
        prop_oneof![3 => Just(Op::Submit), 1 => Just(Op::Take)].boxed()
    }

    proptest! {
        #[test]
        fn proptest_latest_wins(ops in prop::collection::vec(op_strategy(), 1..200)) {
            let mailbox = Mailbox::new();
            let mut submitted = 0u64;
            let mut pending: Option<u64> = None;
            let mut superseded = 0u64;
            let mut last_taken = 0u64;

            for op in ops {
                match op {
                    Op::Submit => {
                        submitted += 1;
                        let ticket = mailbox.submit(submitted).unwrap();
                        prop_assert_eq!(ticket.get(), submitted);
                        if pending.replace(submitted).is_some() {
                            superseded += 1;
                        }
                    }
                    Op::Take => match (mailbox.try_take(), pending.take()) {
                        (Some(envelope), Some(exp)) => {
                            prop_assert_eq!(envelope.item, exp);
                            prop_assert_eq!(envelope.ticket.get(), exp);
                            prop_assert!(envelope.ticket.get() > last_taken);
                            last_taken = envelope.ticket.get();
                        }
                        (None, None) => {}
                        (got, exp) => prop_assert!(false, "Took {:?}, expected {:?}", got, exp),
                    },
                }
            }

            prop_assert_eq!(mailbox.superseded(), superseded);
            prop_assert_eq!(mailbox.has_pending(), pending.is_some());
        }
    }
}

#[cfg(test)]
mod pipeline_tests {
    use std::{
        sync::mpsc::{self, Receiver},
        thread,
        time::Duration,
    };

    use rand::{distr::Alphanumeric, Rng};
    use test_case::test_case;

    use qrlive::{
        ECLevel, Generator, Mode, Outcome, Pipeline, PipelineConfig, QrGenerator, Request,
        Ticket, Version,
    };

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn request(text: &str) -> Request {
        Request::builder(text).scale(1).build().unwrap()
    }

    fn next(rx: &Receiver<(Ticket, Outcome)>) -> (Ticket, Outcome) {
        rx.recv_timeout(TIMEOUT).expect("No outcome delivered")
    }

    fn decode(outcome: &Outcome) -> String {
        let artifact = outcome.artifact().expect("Generation failed");
        let (w, h) = artifact.dimensions();
        let image = artifact.image();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
            image.get_pixel(x as u32, y as u32).0[0]
        });
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "Expected exactly one symbol");
        let (_meta, content) = grids[0].decode().expect("Failed to read QR");
        content
    }

    #[test]
    fn test_latest_wins() {
        let (started_tx, started_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let generator = move |req: &Request| {
            started_tx.send(req.text().to_string()).unwrap();
            // Blocks until the gate is dropped
            let _ = gate_rx.recv();
            QrGenerator.generate(req)
        };
        let (tx, rx) = mpsc::channel();
        let pipeline = Pipeline::spawn(generator, tx, PipelineConfig::default()).unwrap();

        pipeline.submit(request("R0")).unwrap();
        assert_eq!(started_rx.recv_timeout(TIMEOUT).unwrap(), "R0");
        for text in ["R1", "R2", "R3"] {
            pipeline.submit(request(text)).unwrap();
        }
        drop(gate_tx);

        let (first, outcome) = next(&rx);
        assert_eq!(first.get(), 1);
        assert!(outcome.is_success());
        let (second, outcome) = next(&rx);
        assert_eq!(second.get(), 4);
        assert!(outcome.is_success());
        assert_eq!(started_rx.recv_timeout(TIMEOUT).unwrap(), "R3");

        assert_eq!(pipeline.superseded(), 2);
        pipeline.shutdown().unwrap();
        assert!(rx.try_recv().is_err());
        assert!(started_rx.try_recv().is_err());
    }

    #[test]
    fn test_no_starvation_under_bursts() {
        let (tx, rx) = mpsc::channel();
        let pipeline = Pipeline::spawn(QrGenerator, tx, PipelineConfig::default()).unwrap();

        let mut last = None;
        for i in 0..200 {
            last = Some(pipeline.submit(request(&format!("BURST {i}"))).unwrap());
            if i % 20 == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }
        let last = last.unwrap();

        let mut delivered = vec![];
        loop {
            let (ticket, outcome) = next(&rx);
            assert!(outcome.is_success());
            delivered.push(ticket);
            if ticket == last {
                break;
            }
        }
        pipeline.shutdown().unwrap();

        // Each outcome is for a distinct, newer request
        assert!(delivered.windows(2).all(|w| w[0] < w[1]), "{delivered:?}");
        assert!(delivered.len() <= 200);
    }

    #[test]
    fn test_no_duplicates_when_paced() {
        let (tx, rx) = mpsc::channel();
        let pipeline = Pipeline::spawn(QrGenerator, tx, PipelineConfig::default()).unwrap();

        for i in 1..=5u64 {
            let ticket = pipeline.submit(request(&format!("PACED {i}"))).unwrap();
            let (got, outcome) = next(&rx);
            assert_eq!(got, ticket);
            assert_eq!(got.get(), i);
            assert!(outcome.is_success());
        }
        pipeline.shutdown().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failure_does_not_stop_worker() {
        let (tx, rx) = mpsc::channel();
        let pipeline = Pipeline::spawn(QrGenerator, tx, PipelineConfig::default()).unwrap();

        let too_long = Request::builder("x".repeat(5000))
            .ec_level(ECLevel::H)
            .version(Version::new(1).unwrap())
            .build()
            .unwrap();
        pipeline.submit(too_long).unwrap();
        let (_, outcome) = next(&rx);
        assert!(!outcome.is_success());
        assert!(outcome.message().is_some_and(|m| !m.is_empty()));

        pipeline.submit(Request::builder("HELLO").ec_level(ECLevel::M).build().unwrap()).unwrap();
        let (_, outcome) = next(&rx);
        assert_eq!(decode(&outcome), "HELLO");

        let bad_numeric = Request::builder("12a").mode(Mode::Numeric).build().unwrap();
        pipeline.submit(bad_numeric).unwrap();
        let (_, outcome) = next(&rx);
        assert!(!outcome.is_success());

        assert!(pipeline.is_running());
        pipeline.shutdown().unwrap();
    }

    #[test]
    fn test_hello_world_scale_5() {
        let (tx, rx) = mpsc::channel();
        let pipeline = Pipeline::spawn(QrGenerator, tx, PipelineConfig::default()).unwrap();
        pipeline.submit(Request::builder("HELLO").ec_level(ECLevel::M).build().unwrap()).unwrap();

        let (ticket, outcome) = next(&rx);
        pipeline.shutdown().unwrap();

        assert_eq!(ticket.get(), 1);
        let artifact = outcome.artifact().unwrap();
        assert_eq!(artifact.module_sz(), 5);
        assert_eq!(artifact.dimensions(), (145, 145));
        assert_eq!(decode(&outcome), "HELLO");
    }

    #[test]
    fn test_throttled_pipeline_delivers_latest() {
        let (tx, rx) = mpsc::channel();
        let config = PipelineConfig::default().throttle(Duration::from_millis(50));
        let pipeline = Pipeline::spawn(QrGenerator, tx, config).unwrap();

        let mut last = None;
        for i in 0..20 {
            last = Some(pipeline.submit(request(&format!("THROTTLE {i}"))).unwrap());
        }
        let last = last.unwrap();
        let (mut ticket, _) = next(&rx);
        while ticket != last {
            ticket = next(&rx).0;
        }
        pipeline.shutdown().unwrap();
    }

    #[test_case("01234567890123456789", ECLevel::L; "numeric_l")]
    #[test_case("HELLO WORLD $%*+-./:", ECLevel::M; "alphanumeric_m")]
    #[test_case("Hello, world!🌎", ECLevel::Q; "byte_q")]
    #[test_case(&"A11111111111111".repeat(11), ECLevel::H; "long_alphanumeric_h")]
    fn test_generate_and_read(data: &str, ecl: ECLevel) {
        let req = Request::builder(data).ec_level(ecl).scale(3).build().unwrap();
        let outcome = Outcome::Success(QrGenerator.generate(&req).unwrap());
        assert_eq!(decode(&outcome), data);
    }

    #[test]
    fn test_random_payloads() {
        let mut rng = rand::rng();
        for _ in 0..10 {
            let len = rng.random_range(1..300);
            let data: String =
                (&mut rng).sample_iter(Alphanumeric).take(len).map(char::from).collect();
            let req = Request::builder(data.as_str()).scale(2).build().unwrap();
            let outcome = Outcome::Success(QrGenerator.generate(&req).unwrap());
            assert_eq!(decode(&outcome), data);
        }
    }

    #[test]
    fn test_scale_is_monotonic() {
        let mut prev = 0;
        for scale in 1..=8 {
            let req = Request::builder("HELLO").ec_level(ECLevel::M).scale(scale).build().unwrap();
            let artifact = QrGenerator.generate(&req).unwrap();
            let len = artifact.image_bytes().len();
            assert_eq!(len, (29 * scale as usize).pow(2));
            assert!(len > prev);
            prev = len;
        }
    }
}
