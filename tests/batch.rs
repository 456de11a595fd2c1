use assert_fs::prelude::*;
use assert_fs::TempDir;

use mediaprep::classify::{MediaClassifier, MediaContext, MediaKind};
use mediaprep::config::Config;
use mediaprep::looping::{LoopRequest, TransitionSpec};
use mediaprep::media::AudioFormat;
use mediaprep::workflow::{BatchReport, Workflow};

fn workflow_without_encoder() -> Workflow {
    let mut config = Config::default();
    config.media.binary_path = "/nonexistent/bin/ffmpeg".to_string();
    Workflow::new(config, true)
}

#[test]
fn classifies_mixed_batch() {
    let temp = TempDir::new().unwrap();
    temp.child("a.mp3").touch().unwrap();
    temp.child("b.txt").touch().unwrap();
    temp.child("c.wav").touch().unwrap();
    temp.child("d.mov").touch().unwrap();
    temp.child("folder.mp4").create_dir_all().unwrap();

    let audio = MediaClassifier::new(MediaContext::Audio, false);
    let video = MediaClassifier::new(MediaContext::Video, false);

    assert_eq!(audio.classify(temp.child("a.mp3").path()).unwrap(), MediaKind::Audio);
    assert_eq!(audio.classify(temp.child("b.txt").path()).unwrap(), MediaKind::Other);
    assert_eq!(audio.classify(temp.child("c.wav").path()).unwrap(), MediaKind::Audio);
    assert_eq!(video.classify(temp.child("d.mov").path()).unwrap(), MediaKind::Video);
    assert_eq!(video.classify(temp.child("folder.mp4").path()).unwrap(), MediaKind::Other);
}

#[tokio::test]
async fn rename_uses_modification_time() {
    let temp = TempDir::new().unwrap();
    let song = temp.child("Song.MP3");
    song.write_str("id3").unwrap();
    let untouched = temp.child("missing.wav");

    let report = workflow_without_encoder()
        .rename(&[song.path().to_path_buf(), untouched.path().to_path_buf()])
        .await
        .unwrap();

    assert_eq!(report, BatchReport { succeeded: 1, skipped: 0, failed: 1 });
    assert!(!song.path().exists());
}

#[tokio::test]
async fn encoder_failures_do_not_abort_batch() {
    let temp = TempDir::new().unwrap();
    temp.child("a.mp3").touch().unwrap();
    temp.child("b.txt").touch().unwrap();
    temp.child("clip.mp4").touch().unwrap();
    let out = temp.child("out");

    let workflow = workflow_without_encoder();

    let report = workflow
        .convert(
            &[temp.child("a.mp3").path().to_path_buf(), temp.child("b.txt").path().to_path_buf()],
            AudioFormat::Wav,
            Some(out.path()),
        )
        .await
        .unwrap();
    assert_eq!(report, BatchReport { succeeded: 0, skipped: 1, failed: 1 });
    assert!(out.path().is_dir());

    let report = workflow
        .loop_videos(
            &[temp.child("clip.mp4").path().to_path_buf()],
            LoopRequest::ByCount(2),
            TransitionSpec::default(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(report.failed, 1);
    assert!(!temp.child("clip_loop-2.mp4").path().exists());
}
