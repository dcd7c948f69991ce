//! The scene lifecycle: `Idle → Loading → {Error, Empty, Active}`.
//!
//! `Active` owns exactly one live [`SceneGeneration`] together with its
//! [`RenderLoop`] and [`ViewportController`] registration. Replacing or
//! tearing down a generation always runs the full disposal (stop loop,
//! unregister resize listener, release resources, detach surface) before
//! anything new is built, in a single synchronous step.

use crate::backend::RenderBackend;
use crate::builder::{SceneBuilder, SceneSettings};
use crate::camera::OrbitControls;
use crate::entity::EntityRecord;
use crate::error::{FetchError, SceneError};
use crate::generation::{GenerationToken, SceneGeneration, Staleness};
use crate::icons::IconLoader;
use crate::layout::LayoutPolicy;
use crate::render_loop::{FrameScheduler, RenderLoop, TickOutcome};
use crate::resources::ResourceTracker;
use crate::viewport::{ResizeListeners, Viewport, ViewportController};

/// What the upstream data source reports.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Error(String),
    Ready(Vec<EntityRecord>),
    Empty,
}

impl From<Result<Vec<EntityRecord>, FetchError>> for LoadState {
    fn from(result: Result<Vec<EntityRecord>, FetchError>) -> Self {
        match result {
            Ok(entities) if entities.is_empty() => LoadState::Empty,
            Ok(entities) => LoadState::Ready(entities),
            Err(err) => LoadState::Error(err.to_string()),
        }
    }
}

/// The live generation and everything registered on its behalf.
pub struct ActiveScene {
    generation: SceneGeneration,
    render_loop: RenderLoop,
    viewport: ViewportController,
    entities: Vec<EntityRecord>,
}

impl ActiveScene {
    pub fn generation(&self) -> &SceneGeneration {
        &self.generation
    }

    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn viewport_controller(&self) -> &ViewportController {
        &self.viewport
    }

    fn dispose<B: RenderBackend + ?Sized>(
        &mut self,
        tracker: &mut ResourceTracker,
        backend: &mut B,
        listeners: &mut ResizeListeners,
    ) -> usize {
        self.render_loop.stop();
        self.viewport.unregister(listeners);
        let released = self.generation.dispose(tracker, backend);
        backend.detach();
        released
    }
}

pub enum LifecycleState {
    Idle,
    Loading,
    Error(String),
    Empty,
    Active(ActiveScene),
}

/// Payload-free view of a [`LifecycleState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Error,
    Empty,
    Active,
}

impl LifecycleState {
    pub fn phase(&self) -> Phase {
        match self {
            LifecycleState::Idle => Phase::Idle,
            LifecycleState::Loading => Phase::Loading,
            LifecycleState::Error(_) => Phase::Error,
            LifecycleState::Empty => Phase::Empty,
            LifecycleState::Active(_) => Phase::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveScene> {
        match self {
            LifecycleState::Active(scene) => Some(scene),
            _ => None,
        }
    }
}

/// Outcome of one [`SceneLifecycle::poll_icons`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IconPollStats {
    pub attached: usize,
    pub failed: usize,
    /// Completions for a generation that is no longer live.
    pub stale: usize,
}

pub struct SceneLifecycle<B: RenderBackend, L: IconLoader, S: FrameScheduler> {
    state: LifecycleState,
    settings: SceneSettings,
    policy: LayoutPolicy,
    viewport: Viewport,
    tracker: ResourceTracker,
    listeners: ResizeListeners,
    next_token: u64,
    backend: B,
    icons: L,
    scheduler: S,
}

impl<B: RenderBackend, L: IconLoader, S: FrameScheduler> SceneLifecycle<B, L, S> {
    pub fn new(
        backend: B,
        icons: L,
        scheduler: S,
        settings: SceneSettings,
        policy: LayoutPolicy,
        viewport: Viewport,
    ) -> Self {
        Self {
            state: LifecycleState::Idle,
            settings,
            policy,
            viewport,
            tracker: ResourceTracker::new(),
            listeners: ResizeListeners::default(),
            next_token: 1,
            backend,
            icons,
            scheduler,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn live_generation(&self) -> Option<&SceneGeneration> {
        self.state.active().map(ActiveScene::generation)
    }

    /// Orbit controls of the live generation, for feeding pointer input.
    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        match &mut self.state {
            LifecycleState::Active(scene) => Some(&mut scene.generation.controls),
            _ => None,
        }
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    pub fn listeners(&self) -> &ResizeListeners {
        &self.listeners
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn icons(&self) -> &L {
        &self.icons
    }

    pub fn icons_mut(&mut self) -> &mut L {
        &mut self.icons
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// `Idle → Loading`. Ignored in any other state.
    pub fn start(&mut self) {
        match self.state.phase() {
            Phase::Idle => {
                log::info!("Scene lifecycle: idle -> loading");
                self.state = LifecycleState::Loading;
            }
            phase => log::debug!("Ignoring start while {phase:?}"),
        }
    }

    /// Feeds the result of a fetch into the state machine.
    pub fn on_fetch_result(
        &mut self,
        result: Result<Vec<EntityRecord>, FetchError>,
    ) -> Result<(), SceneError> {
        self.apply(LoadState::from(result))
    }

    /// Applies an upstream load state.
    ///
    /// Besides the primary transitions, a non-empty snapshot while `Empty`
    /// activates, an empty snapshot while `Active` disposes into `Empty`, and
    /// a failure while `Active` keeps the live generation. `Error` is
    /// terminal and `Idle` drops everything until [`Self::start`].
    pub fn apply(&mut self, load: LoadState) -> Result<(), SceneError> {
        let load = match load {
            LoadState::Ready(entities) if entities.is_empty() => LoadState::Empty,
            load => load,
        };
        match (self.state.phase(), load) {
            (Phase::Idle, LoadState::Loading) => {
                self.start();
                Ok(())
            }
            (Phase::Idle, _) => {
                log::debug!("Dropping load result received while idle");
                Ok(())
            }
            (Phase::Error, _) => Ok(()),
            (_, LoadState::Loading) => Ok(()),

            (Phase::Loading, LoadState::Error(message)) => {
                log::error!("Scene lifecycle: loading -> error ({message})");
                self.state = LifecycleState::Error(message);
                Ok(())
            }
            (Phase::Active, LoadState::Error(message)) => {
                log::warn!("Keeping live scene after refresh failure: {message}");
                Ok(())
            }
            (Phase::Empty, LoadState::Error(message)) => {
                log::warn!("Refresh failed while empty: {message}");
                Ok(())
            }

            (Phase::Empty, LoadState::Empty) => Ok(()),
            (_, LoadState::Empty) => {
                self.dispose_active();
                log::info!("Scene lifecycle: -> empty");
                self.state = LifecycleState::Empty;
                Ok(())
            }

            (_, LoadState::Ready(entities)) => self.activate(entities),
        }
    }

    /// Disposes whatever is live and returns to `Idle`. Safe in every state
    /// and safe to repeat.
    pub fn teardown(&mut self) {
        let was = self.state.phase();
        self.dispose_active();
        self.state = LifecycleState::Idle;
        if was != Phase::Idle {
            log::info!("Scene lifecycle: {was:?} -> idle");
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;

        if let LifecycleState::Active(scene) = &mut self.state {
            scene.viewport.on_resize(
                viewport,
                &self.listeners,
                &mut scene.generation.camera,
                &mut self.backend,
            );
        }
    }

    /// Runs one scheduled frame of the live generation, if any.
    pub fn frame(&mut self) -> TickOutcome {
        let LifecycleState::Active(scene) = &mut self.state else {
            return TickOutcome::Stopped;
        };

        match scene
            .render_loop
            .tick(&mut scene.generation, &mut self.backend, &self.scheduler)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Render failed, disposing scene: {err}");
                self.dispose_active();
                self.state = LifecycleState::Error(err.to_string());
                TickOutcome::Stopped
            }
        }
    }

    /// Applies finished icon loads to the live generation. Completions for
    /// any other generation are discarded.
    pub fn poll_icons(&mut self) -> IconPollStats {
        let mut stats = IconPollStats::default();

        for completion in self.icons.poll() {
            let scene = match &mut self.state {
                LifecycleState::Active(scene)
                    if scene.generation.check(completion.token) == Staleness::Live =>
                {
                    scene
                }
                _ => {
                    log::trace!(
                        "Discarding stale icon for generation {}",
                        completion.token.raw()
                    );
                    stats.stale += 1;
                    continue;
                }
            };

            let icon = match completion.result {
                Ok(icon) => icon,
                Err(err) => {
                    log::warn!("Icon for entity {} unavailable: {err}", completion.sphere);
                    stats.failed += 1;
                    continue;
                }
            };

            let generation = &mut scene.generation;
            let attached = generation.attach_logo(
                completion.sphere,
                icon,
                self.settings.logo_scale,
                &mut self.tracker,
            );
            if attached.is_none() {
                stats.stale += 1;
                continue;
            }

            let mut uploaded = true;
            for (id, desc) in generation.take_pending_uploads() {
                if let Err(err) = self.backend.create_resource(id, &desc) {
                    log::warn!("Icon upload for entity {} failed: {err}", completion.sphere);
                    uploaded = false;
                }
            }

            if uploaded {
                log::debug!("Attached icon to entity {}", completion.sphere);
                stats.attached += 1;
            } else {
                generation.detach_logo(completion.sphere, &mut self.tracker, &mut self.backend);
                stats.failed += 1;
            }
        }

        stats
    }

    fn activate(&mut self, entities: Vec<EntityRecord>) -> Result<(), SceneError> {
        // The previous generation is fully gone before anything new exists.
        self.dispose_active();

        let token = GenerationToken(self.next_token);
        self.next_token += 1;

        if let Err(err) = self.backend.attach(self.viewport) {
            self.backend.detach();
            return self.fail_activation(err);
        }

        let mut generation = SceneBuilder::new(&self.settings).build(
            &entities,
            self.policy,
            token,
            self.viewport,
            &mut self.tracker,
            &mut self.icons,
        );

        for (id, desc) in generation.take_pending_uploads() {
            if let Err(err) = self.backend.create_resource(id, &desc) {
                generation.dispose(&mut self.tracker, &mut self.backend);
                self.backend.detach();
                return self.fail_activation(err);
            }
        }

        let mut viewport = ViewportController::new();
        viewport.register(&mut self.listeners);
        viewport.on_resize(
            self.viewport,
            &self.listeners,
            &mut generation.camera,
            &mut self.backend,
        );

        let mut render_loop = RenderLoop::new(self.settings.spin_per_frame);
        render_loop.start(&self.scheduler);

        log::info!(
            "Scene lifecycle: -> active (generation {}, {} entities)",
            token.raw(),
            entities.len()
        );

        self.state = LifecycleState::Active(ActiveScene {
            generation,
            render_loop,
            viewport,
            entities,
        });
        Ok(())
    }

    fn fail_activation(&mut self, err: SceneError) -> Result<(), SceneError> {
        log::error!("Scene activation failed: {err}");
        self.state = LifecycleState::Error(err.to_string());
        Err(err)
    }

    /// Disposes the live generation, if any, leaving the state `Idle`.
    fn dispose_active(&mut self) -> bool {
        match std::mem::replace(&mut self.state, LifecycleState::Idle) {
            LifecycleState::Active(mut scene) => {
                let token = scene.generation.token();
                let released =
                    scene.dispose(&mut self.tracker, &mut self.backend, &mut self.listeners);
                log::info!(
                    "Disposed generation {} | released={} | still live={}",
                    token.raw(),
                    released,
                    self.tracker.live_count()
                );
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }
}

impl<B: RenderBackend, L: IconLoader, S: FrameScheduler> Drop for SceneLifecycle<B, L, S> {
    fn drop(&mut self) {
        self.dispose_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetLoadError;
    use crate::testing::{entities, icon, BackendEvent, CountingScheduler, ManualIconLoader, RecordingBackend};

    type TestLifecycle = SceneLifecycle<RecordingBackend, ManualIconLoader, CountingScheduler>;

    fn lifecycle() -> TestLifecycle {
        SceneLifecycle::new(
            RecordingBackend::default(),
            ManualIconLoader::default(),
            CountingScheduler::default(),
            SceneSettings::default(),
            LayoutPolicy::default(),
            Viewport::new(800, 600),
        )
    }

    fn with_icons(n: usize) -> Vec<EntityRecord> {
        entities(n)
            .into_iter()
            .enumerate()
            .map(|(i, e)| e.with_icon(format!("file:///icons/{i}.png")))
            .collect()
    }

    fn active(records: Vec<EntityRecord>) -> TestLifecycle {
        let mut lc = lifecycle();
        lc.start();
        lc.on_fetch_result(Ok(records)).unwrap();
        assert!(lc.state().is_active());
        lc
    }

    #[test]
    fn load_state_from_fetch_result() {
        assert_eq!(LoadState::from(Ok(Vec::new())), LoadState::Empty);
        assert_eq!(LoadState::from(Ok(entities(1))), LoadState::Ready(entities(1)));
        let err = FetchError::Transport("connection refused".into());
        assert!(matches!(
            LoadState::from(Err(err)),
            LoadState::Error(message) if message.contains("connection refused")
        ));
    }

    #[test]
    fn start_moves_idle_to_loading_once() {
        let mut lc = lifecycle();
        assert_eq!(lc.state().phase(), Phase::Idle);
        lc.start();
        assert_eq!(lc.state().phase(), Phase::Loading);
        lc.start();
        assert_eq!(lc.state().phase(), Phase::Loading);
        assert!(lc.backend().events.is_empty());
    }

    #[test]
    fn results_while_idle_are_ignored() {
        let mut lc = lifecycle();
        lc.on_fetch_result(Ok(entities(2))).unwrap();
        assert_eq!(lc.state().phase(), Phase::Idle);
        assert!(lc.backend().events.is_empty());

        lc.apply(LoadState::Loading).unwrap();
        assert_eq!(lc.state().phase(), Phase::Loading);
    }

    #[test]
    fn fetch_error_is_terminal() {
        let mut lc = lifecycle();
        lc.start();
        lc.on_fetch_result(Err(FetchError::Transport("timeout".into()))).unwrap();
        assert!(matches!(lc.state(), LifecycleState::Error(m) if m.contains("timeout")));

        lc.on_fetch_result(Ok(entities(2))).unwrap();
        assert_eq!(lc.state().phase(), Phase::Error);
        assert!(lc.backend().events.is_empty());
        assert_eq!(lc.tracker().live_count(), 0);
    }

    #[test]
    fn empty_snapshot_builds_nothing_then_data_activates() {
        let mut lc = lifecycle();
        lc.start();
        lc.on_fetch_result(Ok(Vec::new())).unwrap();
        assert_eq!(lc.state().phase(), Phase::Empty);
        assert!(lc.backend().events.is_empty());
        assert!(lc.listeners().is_empty());

        lc.on_fetch_result(Ok(entities(2))).unwrap();
        assert_eq!(lc.state().phase(), Phase::Active);
        assert_eq!(lc.live_generation().unwrap().spheres.len(), 2);
    }

    #[test]
    fn ready_without_entities_is_treated_as_empty() {
        let mut lc = lifecycle();
        lc.start();
        lc.apply(LoadState::Ready(Vec::new())).unwrap();
        assert_eq!(lc.state().phase(), Phase::Empty);
        assert!(lc.backend().events.is_empty());
        assert!(lc.listeners().is_empty());
        assert_eq!(lc.scheduler().requests(), 0);

        let mut lc = active(entities(2));
        lc.apply(LoadState::Ready(Vec::new())).unwrap();
        assert_eq!(lc.state().phase(), Phase::Empty);
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(!lc.backend().attached);
    }

    #[test]
    fn ready_snapshot_builds_one_live_generation() {
        let lc = active(entities(2));

        let generation = lc.live_generation().unwrap();
        assert_eq!(generation.spheres.len(), 2);
        assert_eq!(generation.labels.len(), 2);
        // One shared geometry, a material and a label texture per entity.
        assert_eq!(lc.tracker().live_count(), 5);
        assert_eq!(lc.backend().live.len(), 5);

        assert_eq!(lc.backend().events.first(), Some(&BackendEvent::Attach));
        assert_eq!(lc.backend().resizes, vec![Viewport::new(800, 600)]);
        assert_eq!(lc.listeners().len(), 1);
        assert_eq!(lc.scheduler().requests(), 1);

        let scene = lc.state().active().unwrap();
        assert!(scene.render_loop().is_running());
        assert!(scene.viewport_controller().is_registered());
        assert_eq!(scene.entities().len(), 2);
    }

    #[test]
    fn new_snapshot_disposes_previous_generation_first() {
        let mut lc = active(entities(1));
        let old_token = lc.live_generation().unwrap().token();
        let old_resources = lc.live_generation().unwrap().resources().to_vec();
        assert_eq!(old_resources.len(), 3);

        lc.on_fetch_result(Ok(entities(2))).unwrap();

        let backend = lc.backend();
        assert_eq!(backend.live_at_attach, vec![0, 0]);

        let second_attach = backend
            .events
            .iter()
            .rposition(|e| *e == BackendEvent::Attach)
            .unwrap();
        let before = &backend.events[..second_attach];
        for id in &old_resources {
            assert!(before.contains(&BackendEvent::Release(*id)));
        }
        assert_eq!(before.last(), Some(&BackendEvent::Detach));

        let generation = lc.live_generation().unwrap();
        assert_ne!(generation.token(), old_token);
        assert_eq!(generation.check(old_token), Staleness::Stale);
        assert_eq!(generation.spheres.len(), 2);
        assert_eq!(lc.tracker().live_count(), 5);
        assert_eq!(lc.listeners().len(), 1);
    }

    #[test]
    fn frames_render_until_teardown() {
        let mut lc = active(entities(3));
        assert_eq!(lc.frame(), TickOutcome::Rendered);
        assert_eq!(lc.frame(), TickOutcome::Rendered);
        assert_eq!(lc.backend().renders, 2);
        assert_eq!(lc.scheduler().requests(), 3);

        lc.teardown();
        assert_eq!(lc.frame(), TickOutcome::Stopped);
        assert_eq!(lc.backend().renders, 2);
        assert_eq!(lc.scheduler().requests(), 3);
    }

    #[test]
    fn teardown_releases_everything_and_is_idempotent() {
        let mut lc = active(entities(4));
        lc.teardown();
        lc.teardown();

        assert_eq!(lc.state().phase(), Phase::Idle);
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(lc.backend().live.is_empty());
        assert!(!lc.backend().attached);
        assert!(lc.listeners().is_empty());
        assert_eq!(lc.backend().count(|e| *e == BackendEvent::Detach), 1);
    }

    #[test]
    fn teardown_outside_active_touches_nothing() {
        let mut lc = lifecycle();
        lc.teardown();
        lc.start();
        lc.teardown();
        assert_eq!(lc.state().phase(), Phase::Idle);
        assert!(lc.backend().events.is_empty());

        lc.start();
        lc.on_fetch_result(Ok(Vec::new())).unwrap();
        lc.teardown();
        assert!(lc.backend().events.is_empty());
    }

    #[test]
    fn refresh_failure_keeps_live_scene() {
        let mut lc = active(entities(2));
        let token = lc.live_generation().unwrap().token();

        lc.on_fetch_result(Err(FetchError::Transport("offline".into()))).unwrap();

        assert_eq!(lc.state().phase(), Phase::Active);
        assert_eq!(lc.live_generation().unwrap().token(), token);
        assert_eq!(lc.frame(), TickOutcome::Rendered);
    }

    #[test]
    fn empty_refresh_disposes_live_scene() {
        let mut lc = active(entities(2));
        lc.on_fetch_result(Ok(Vec::new())).unwrap();

        assert_eq!(lc.state().phase(), Phase::Empty);
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(lc.backend().live.is_empty());
        assert!(lc.listeners().is_empty());
        assert_eq!(lc.frame(), TickOutcome::Stopped);
    }

    #[test]
    fn icons_attach_to_the_live_generation() {
        let mut lc = active(with_icons(2));
        assert_eq!(lc.icons().requests.len(), 2);
        assert_eq!(lc.icons().pending(), 2);

        lc.icons_mut().resolve(1, Ok(icon()));
        let stats = lc.poll_icons();

        assert_eq!(stats, IconPollStats { attached: 1, failed: 0, stale: 0 });
        let generation = lc.live_generation().unwrap();
        assert!(generation.spheres[0].logo.is_none());
        assert!(generation.spheres[1].logo.is_some());
        assert_eq!(lc.tracker().live_count(), 6);
        assert_eq!(lc.backend().live.len(), 6);
    }

    #[test]
    fn icon_for_replaced_generation_is_discarded() {
        let mut lc = active(with_icons(2));
        lc.on_fetch_result(Ok(with_icons(2))).unwrap();
        assert_eq!(lc.icons().requests.len(), 4);

        lc.icons_mut().resolve(0, Ok(icon()));
        lc.icons_mut().resolve(3, Ok(icon()));
        let stats = lc.poll_icons();

        assert_eq!(stats, IconPollStats { attached: 1, failed: 0, stale: 1 });
        let generation = lc.live_generation().unwrap();
        assert!(generation.spheres[0].logo.is_none());
        assert!(generation.spheres[1].logo.is_some());
    }

    #[test]
    fn icon_after_teardown_is_discarded() {
        let mut lc = active(with_icons(1));
        lc.teardown();
        lc.icons_mut().resolve(0, Ok(icon()));

        assert_eq!(lc.poll_icons().stale, 1);
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(lc.backend().live.is_empty());
    }

    #[test]
    fn failed_icon_leaves_sphere_without_logo() {
        let mut lc = active(with_icons(2));
        lc.icons_mut()
            .resolve(0, Err(AssetLoadError::Http("404 Not Found".into())));
        lc.icons_mut().resolve(1, Ok(icon()));

        let stats = lc.poll_icons();

        assert_eq!(stats, IconPollStats { attached: 1, failed: 1, stale: 0 });
        assert_eq!(lc.live_generation().unwrap().logo_count(), 1);
        assert_eq!(lc.frame(), TickOutcome::Rendered);
    }

    #[test]
    fn icon_upload_failure_releases_the_texture() {
        let mut lc = active(with_icons(1));
        let live_before = lc.tracker().live_count();
        lc.backend_mut().fail_textures = true;

        lc.icons_mut().resolve(0, Ok(icon()));
        let stats = lc.poll_icons();

        assert_eq!(stats.failed, 1);
        let generation = lc.live_generation().unwrap();
        assert_eq!(generation.logo_count(), 0);
        assert_eq!(generation.resources().len(), live_before);
        assert_eq!(lc.tracker().live_count(), live_before);
    }

    #[test]
    fn attach_failure_moves_to_error() {
        let mut lc = lifecycle();
        lc.backend_mut().fail_attach = true;
        lc.start();

        let result = lc.on_fetch_result(Ok(entities(2)));

        assert!(result.is_err());
        assert_eq!(lc.state().phase(), Phase::Error);
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(lc.listeners().is_empty());
        assert_eq!(lc.backend().count(|e| matches!(e, BackendEvent::Create(_))), 0);
    }

    #[test]
    fn upload_failure_during_activation_rolls_back() {
        let mut lc = lifecycle();
        lc.backend_mut().fail_textures = true;
        lc.start();

        assert!(lc.on_fetch_result(Ok(entities(2))).is_err());

        assert_eq!(lc.state().phase(), Phase::Error);
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(lc.backend().live.is_empty());
        assert!(!lc.backend().attached);
        assert!(lc.listeners().is_empty());
        assert_eq!(lc.scheduler().requests(), 0);
    }

    #[test]
    fn render_failure_disposes_into_error() {
        let mut lc = active(entities(2));
        lc.backend_mut().fail_render = true;

        assert_eq!(lc.frame(), TickOutcome::Stopped);

        assert!(matches!(lc.state(), LifecycleState::Error(m) if m.contains("device lost")));
        assert_eq!(lc.tracker().live_count(), 0);
        assert!(lc.backend().live.is_empty());
        assert!(lc.listeners().is_empty());
    }

    #[test]
    fn pointer_input_reaches_the_camera_on_the_next_frame() {
        let mut lc = lifecycle();
        assert!(lc.controls_mut().is_none());

        lc.start();
        lc.on_fetch_result(Ok(entities(1))).unwrap();
        let radius = lc.live_generation().unwrap().camera.radius;
        lc.controls_mut().unwrap().zoom(5.0);
        lc.frame();

        assert!(lc.live_generation().unwrap().camera.radius < radius);
    }

    #[test]
    fn resize_before_activation_is_applied_on_build() {
        let mut lc = lifecycle();
        lc.resize(Viewport::new(1000, 500));
        assert!(lc.backend().resizes.is_empty());

        lc.start();
        lc.on_fetch_result(Ok(entities(1))).unwrap();

        assert_eq!(lc.backend().resizes, vec![Viewport::new(1000, 500)]);
        assert_eq!(lc.live_generation().unwrap().camera.aspect, 2.0);
    }

    #[test]
    fn resize_while_active_updates_camera_and_surface() {
        let mut lc = active(entities(1));
        lc.resize(Viewport::new(1200, 400));
        lc.resize(Viewport::new(0, 400));

        assert_eq!(lc.viewport(), Viewport::new(1200, 400));
        assert_eq!(lc.live_generation().unwrap().camera.aspect, 3.0);
        assert_eq!(lc.backend().resizes.last(), Some(&Viewport::new(1200, 400)));
        assert_eq!(lc.backend().resizes.len(), 2);
    }
}
