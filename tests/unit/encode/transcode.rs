use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[derive(Default)]
struct Log {
    files: HashMap<String, Vec<u8>>,
    execs: Vec<Vec<String>>,
    deleted: Vec<String>,
}

/// Pretends to be ffmpeg: "transcodes" by prefixing the input bytes.
struct FakeEngine {
    log: Arc<Mutex<Log>>,
    fail_exec: bool,
}

impl EncodeEngine for FakeEngine {
    fn write_file(&mut self, name: &str, bytes: &[u8]) -> FlightResult<()> {
        self.log
            .lock()
            .unwrap()
            .files
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn exec(&mut self, args: &[String], cancel: &CancelToken) -> FlightResult<()> {
        cancel.check()?;
        let mut log = self.log.lock().unwrap();
        log.execs.push(args.to_vec());
        if self.fail_exec {
            return Err(FlightError::encode("boom"));
        }
        let mut out = b"mp4:".to_vec();
        out.extend_from_slice(&log.files[INPUT_NAME]);
        log.files.insert(OUTPUT_NAME.to_string(), out);
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> FlightResult<Vec<u8>> {
        self.log
            .lock()
            .unwrap()
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| FlightError::encode(format!("no file {name}")))
    }

    fn delete_file(&mut self, name: &str) -> FlightResult<()> {
        let mut log = self.log.lock().unwrap();
        log.files.remove(name);
        log.deleted.push(name.to_string());
        Ok(())
    }
}

fn fake(fail_exec: bool) -> (Transcoder, Arc<Mutex<Log>>, Arc<AtomicUsize>) {
    let log = Arc::new(Mutex::new(Log::default()));
    let loads = Arc::new(AtomicUsize::new(0));
    let (l, n) = (log.clone(), loads.clone());
    let t = Transcoder::with_loader(move || {
        n.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeEngine {
            log: l.clone(),
            fail_exec,
        }) as Box<dyn EncodeEngine>)
    });
    (t, log, loads)
}

fn temp_audio(name: &str) -> std::path::PathBuf {
    let p = std::env::temp_dir().join(format!(
        "flightpath_{}_{}_{name}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::write(&p, b"ID3-audio").unwrap();
    p
}

#[test]
fn args_without_audio_drop_audio_stream() {
    let args = transcode_args(None);
    assert_eq!(
        args,
        [
            "-i",
            "input.webm",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
            "output.mp4"
        ]
    );
}

#[test]
fn args_with_audio_map_both_inputs_and_cut_to_shortest() {
    let args = transcode_args(Some("audio.mp3"));
    let joined = args.join(" ");
    assert!(joined.starts_with("-i input.webm -i audio.mp3 -map 0:v:0 -map 1:a:0"));
    assert!(joined.contains("-c:a aac"));
    assert!(joined.contains("-shortest"));
    assert!(joined.ends_with("-movflags +faststart output.mp4"));
}

#[test]
fn engine_loads_once_and_is_reused() {
    let (t, log, loads) = fake(false);
    assert!(!t.is_loaded());
    let raw = VideoBlob::webm(b"raw".to_vec());

    let out = t.transcode(&raw, None, &CancelToken::new()).unwrap();
    assert_eq!(out.mime, "video/mp4");
    assert_eq!(out.bytes, b"mp4:raw");
    t.transcode(&raw, None, &CancelToken::new()).unwrap();

    assert!(t.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(log.lock().unwrap().execs.len(), 2);
}

#[test]
fn audio_is_written_under_its_extension_and_cleaned_up() {
    let (t, log, _) = fake(false);
    let audio = temp_audio("track.MP3");
    t.transcode(&VideoBlob::webm(b"raw".to_vec()), Some(&audio), &CancelToken::new())
        .unwrap();

    let log = log.lock().unwrap();
    assert!(log.execs[0].contains(&"audio.mp3".to_string()));
    assert!(log.deleted.contains(&"audio.mp3".to_string()));
    assert!(log.files.is_empty(), "scratch files left: {:?}", log.files.keys());
    std::fs::remove_file(&audio).ok();
}

#[test]
fn failed_exec_is_encode_error_and_still_cleans_up() {
    let (t, log, _) = fake(true);
    let raw = VideoBlob::webm(b"raw".to_vec());
    let err = t.transcode(&raw, None, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, FlightError::Encode(_)));
    assert!(log.lock().unwrap().files.is_empty());
    assert_eq!(raw.bytes, b"raw");
}

#[test]
fn load_failure_is_encode_error_and_retried_next_time() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let a = attempts.clone();
    let t = Transcoder::with_loader(move || {
        a.fetch_add(1, Ordering::SeqCst);
        Err(FlightError::validation("no engine here"))
    });
    let raw = VideoBlob::webm(b"raw".to_vec());
    for _ in 0..2 {
        let err = t.transcode(&raw, None, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, FlightError::Encode(_)));
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(!t.is_loaded());
}

#[test]
fn cancelled_transcode_reports_cancelled() {
    let (t, _, _) = fake(false);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = t
        .transcode(&VideoBlob::webm(b"raw".to_vec()), None, &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn missing_audio_file_is_encode_error() {
    let (t, _, loads) = fake(false);
    let err = t
        .transcode(
            &VideoBlob::webm(b"raw".to_vec()),
            Some(Path::new("/no/such/track.mp3")),
            &CancelToken::new(),
        )
        .unwrap_err();
    assert!(matches!(err, FlightError::Encode(_)));
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}
