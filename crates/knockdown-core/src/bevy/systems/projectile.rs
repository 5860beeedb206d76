//! Projectile throwing and hit scoring.

use bevy::prelude::*;

use crate::bevy::{
    CameraPose, LaunchVelocity, PlacedObject, Projectile, ProjectileContactEvent, SessionScore,
    ThrowRequestedEvent,
};
use crate::config::SessionConfig;

/// System spawning a projectile from the camera pose for each throw request.
///
/// The launch velocity is a component for the platform physics to consume;
/// this crate never integrates it.
pub fn handle_throw_requests(
    mut commands: Commands,
    mut requests: MessageReader<ThrowRequestedEvent>,
    camera: Res<CameraPose>,
    config: Res<SessionConfig>,
) {
    for _request in requests.read() {
        let velocity = camera.forward() * config.throw_force;
        commands.spawn((
            Projectile::default(),
            Transform::from_translation(camera.position).with_rotation(camera.rotation),
            LaunchVelocity(velocity),
        ));
        tracing::debug!("[game] projectile thrown at {velocity}");
    }
}

/// System scoring reported projectile contacts.
///
/// A projectile scores at most once, on its first contact with a placed
/// object. Contacts with anything else are ignored.
pub fn record_projectile_hits(
    mut contacts: MessageReader<ProjectileContactEvent>,
    mut projectiles: Query<&mut Projectile>,
    objects: Query<(), With<PlacedObject>>,
    mut score: ResMut<SessionScore>,
) {
    for contact in contacts.read() {
        if objects.get(contact.other).is_err() {
            continue;
        }
        let Ok(mut projectile) = projectiles.get_mut(contact.projectile) else {
            continue;
        };
        if projectile.scored {
            continue;
        }
        projectile.scored = true;
        score.object_hits += 1;
        tracing::info!("[game] projectile hit, score {}", score.object_hits);
    }
}
